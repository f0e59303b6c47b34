#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("recursive mapping: expansion depth {depth} exceeds max_map_depth {limit}")]
    RecursiveMapping { depth: u32, limit: u32 },
}
