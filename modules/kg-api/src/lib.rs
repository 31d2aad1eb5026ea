use kg_graph::GraphReader;
use kg_retrieval::RetrievalEngine;

pub mod handlers;

pub struct AppState {
    pub engine: RetrievalEngine,
    pub reader: GraphReader,
}
