//! Disposal state of a [`SafeDisposable`](crate::SafeDisposable).

/// One-way lifecycle: `Active` → `Disposing` → `Disposed`.
///
/// # Examples
///
/// ```rust
/// use disposal_groups::{DisposalState, SafeDisposable};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let service = SafeDisposable::new("service");
/// assert_eq!(service.state(), DisposalState::Active);
/// assert!(!service.is_disposed());
///
/// service.dispose().await.unwrap();
/// assert_eq!(service.state(), DisposalState::Disposed);
/// assert!(service.is_disposed());
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisposalState {
    /// Accepting guards, timers and disposables
    Active,
    /// `dispose()` is running
    ///
    /// Guards are refused unless taken with `used_while_disposing`; timers are
    /// refused and pending timer callbacks are skipped.
    Disposing,
    /// `dispose()` finished, successfully or not
    Disposed,
}

impl DisposalState {
    /// True once disposal was requested, whether or not it finished.
    pub fn is_disposed(self) -> bool {
        self != DisposalState::Active
    }
}
