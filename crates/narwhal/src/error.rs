#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("link references a node identity that is not in the node set: {id}")]
    UnresolvedReference { id: String },

    #[error("no force registered under name: {name}")]
    ForceNotFound { name: String },

    #[error("graph contains an edge with a missing endpoint: {edge_id}")]
    MissingEndpoint { edge_id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
