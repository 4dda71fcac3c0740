mod construct_quads;
mod expression_rewriter;
mod graph_pattern_rewriter;

pub(crate) use construct_quads::parse_construct_quads;
pub use graph_pattern_rewriter::GraphPatternRewriter;
