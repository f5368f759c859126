mod common;
mod document;
mod status_graph;
