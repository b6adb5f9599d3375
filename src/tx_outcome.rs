/// Resolution of one gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
}

impl TxOutcome {
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, TxOutcome::Committed)
    }
}

/// Signal a transaction body reports back to the gateway.
///
/// `true` and `Ok` commit; `false` and `Err` roll back. A result's success
/// payload is discarded; only the discriminant drives the bracketing.
pub trait TxVerdict {
    fn should_commit(&self) -> bool;
}

impl TxVerdict for bool {
    fn should_commit(&self) -> bool {
        *self
    }
}

impl<T, E> TxVerdict for Result<T, E> {
    fn should_commit(&self) -> bool {
        self.is_ok()
    }
}
