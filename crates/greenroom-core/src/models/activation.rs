/// Per-ref state of a deep-link resolution attempt. Transient, held only in
/// the engine's resolution arena; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActivationState {
    #[default]
    Idle,
    Resolving,
    Active,
    Failed(String),
}
