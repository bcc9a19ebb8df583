//! Block tree and translation points.
//!
//! Pass 1 records a parallel tree of statement-list-owning nodes (brace
//! blocks, `case` bodies, `select` comm clause bodies) carrying the
//! translation points discovered at each block's own statement level.
//! Pass 2 consumes them in block order, with stable discovery-time
//! statement indices, independent of the deep traversal order pass 1
//! used to find them.

use trygo_parser::ast::{ExprId, FuncDeclId, SimpleStmtId, Span, SpecIdx, StmtId, StmtListOwner};

/// Syntactic kind of one `try(...)` occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransKind {
    /// `var $names = try(f(...))` (single value spec)
    ValueSpec,
    /// `$lhs := try(f(...))` or `$lhs = try(f(...))`
    Assign,
    /// Standalone `try(f(...))` statement at block level
    ToplevelCall,
}

impl std::fmt::Display for TransKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransKind::ValueSpec => "value spec",
            TransKind::Assign => "assignment",
            TransKind::ToplevelCall => "toplevel call",
        };
        f.write_str(s)
    }
}

/// The enclosing function frame of a translation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncRef {
    Decl(FuncDeclId),
    Lit(ExprId),
}

/// The host syntax node a translation mutates in pass 2.
#[derive(Debug, Clone, Copy)]
pub enum TransTarget {
    /// The value spec inside a `var`/`const` declaration.
    Spec(SpecIdx),
    /// The assignment or short variable declaration.
    Assign(SimpleStmtId),
    /// The expression statement holding a toplevel `try(...)`.
    ExprStmt(StmtId),
}

/// One recorded `try(...)` occurrence awaiting phase-2 insertion.
#[derive(Debug, Clone, Copy)]
pub struct TransPoint {
    pub kind: TransKind,
    pub target: TransTarget,
    /// The inner call; after pass 1 this node *is* `f(...)`, the `try`
    /// wrapper having been squashed in place.
    pub call: ExprId,
    pub fun: FuncRef,
    /// Statement index inside the host block at discovery time.
    pub block_index: usize,
    /// Index of the source file the point was found in.
    pub file_idx: usize,
    pub pos: Span,
}

pub type BlockNodeId = usize;

#[derive(Debug)]
pub struct BlockNode {
    pub owner: StmtListOwner,
    /// Must stay in host-statement order, earliest first.
    pub trans_points: Vec<TransPoint>,
    pub parent: Option<BlockNodeId>,
    pub children: Vec<BlockNodeId>,
}

/// Index-based tree over all blocks pass 1 entered.
#[derive(Debug, Default)]
pub struct BlockTree {
    nodes: Vec<BlockNode>,
    pub roots: Vec<BlockNodeId>,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node linked under `parent`, or registers a new root.
    pub fn push_block(&mut self, owner: StmtListOwner, parent: Option<BlockNodeId>) -> BlockNodeId {
        let id = self.nodes.len();
        self.nodes.push(BlockNode {
            owner,
            trans_points: Vec::new(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: BlockNodeId) -> &BlockNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: BlockNodeId) -> &mut BlockNode {
        &mut self.nodes[id]
    }

    /// All translation points, parents before children.
    pub fn collect_trans_points(&self) -> Vec<TransPoint> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_into(root, &mut out);
        }
        out
    }

    fn collect_into(&self, id: BlockNodeId, out: &mut Vec<TransPoint>) {
        out.extend(self.nodes[id].trans_points.iter().copied());
        for &child in &self.nodes[id].children {
            self.collect_into(child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trygo_parser::ast::{AstArena, Block, ListRef, Span as ASpan};

    fn dummy_owner(arena: &mut AstArena) -> StmtListOwner {
        let b = arena.blocks.alloc(
            Block {
                l_brace: ASpan::default(),
                stmts: ListRef::EMPTY,
                r_brace: ASpan::default(),
            },
            ASpan::default(),
        );
        StmtListOwner::Block(b)
    }

    #[test]
    fn roots_and_children() {
        let mut arena = AstArena::new();
        let mut tree = BlockTree::new();
        let root = tree.push_block(dummy_owner(&mut arena), None);
        let child = tree.push_block(dummy_owner(&mut arena), Some(root));
        let root2 = tree.push_block(dummy_owner(&mut arena), None);

        assert_eq!(tree.roots, vec![root, root2]);
        assert_eq!(tree.node(root).children, vec![child]);
        assert_eq!(tree.node(child).parent, Some(root));
    }
}
