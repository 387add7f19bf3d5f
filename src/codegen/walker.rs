use crate::error::CodegenError;
use crate::routine::{ActionKind, NodeKind, ProgramGraph, SourceHandle};
use ahash::AHashSet;

/// Default iteration count for loop nodes whose count is unset.
pub(crate) const DEFAULT_LOOP_COUNT: u32 = 3;

/// Per-backend emission callbacks driven by [`GraphWalker`].
///
/// The walker owns the traversal (straight-line continuation, branch
/// recursion, cycle guarding); an emitter only decides what text one node
/// kind becomes in its target. This is the seam that keeps the four targets
/// from drifting apart structurally.
pub(crate) trait StatementEmitter {
    fn emit_action(&mut self, action: &ActionKind, combined: Option<&ActionKind>);

    fn begin_conditional(&mut self, condition: &str);
    fn begin_else(&mut self);
    fn end_conditional(&mut self);

    /// `iterator` is the loop-variable name for for-each nodes, `None` for
    /// plain counted loops.
    fn begin_loop(&mut self, count: u32, iterator: Option<&str>);
    fn end_loop(&mut self);

    fn begin_parallel(&mut self);
    fn parallel_branch(&mut self, index: u8);
    fn end_parallel(&mut self);

    /// Called when a node id recurs within the current branch's visited set.
    /// Validation makes this unreachable for graphs built through
    /// `add_edge`, but the walker still terminates on arbitrary input.
    fn emit_cycle_guard(&mut self, node_id: &str);
}

/// The shared lowering algorithm over a validated routine graph.
pub(crate) struct GraphWalker<'a> {
    graph: &'a ProgramGraph,
}

impl<'a> GraphWalker<'a> {
    pub fn new(graph: &'a ProgramGraph) -> Self {
        Self { graph }
    }

    /// Lowers the whole routine into `emitter`, starting at the start node's
    /// continuation edge.
    pub fn lower<E: StatementEmitter>(&self, emitter: &mut E) -> Result<(), CodegenError> {
        let start = self.graph.start_id();
        let first = self.graph.next_target(start).ok_or(CodegenError::NoRoute)?;
        let mut visited: AHashSet<String> = AHashSet::new();
        visited.insert(start.to_string());
        self.lower_from(first, emitter, &mut visited);
        Ok(())
    }

    /// Lowers the chain starting at `node_id`. Branch targets recurse with a
    /// branch-scoped clone of the visited set so sibling branches may share
    /// downstream nodes.
    pub fn lower_from<E: StatementEmitter>(
        &self,
        node_id: &str,
        emitter: &mut E,
        visited: &mut AHashSet<String>,
    ) {
        let mut current = Some(node_id.to_string());
        while let Some(id) = current {
            if !visited.insert(id.clone()) {
                emitter.emit_cycle_guard(&id);
                return;
            }
            let Some(node) = self.graph.node(&id) else {
                return;
            };

            match &node.kind {
                NodeKind::Start => {}
                NodeKind::End => return,
                NodeKind::Action { action, combined } => match action {
                    ActionKind::Conditional { condition } => {
                        emitter.begin_conditional(condition);
                        if let Some(target) = self.graph.branch_target(&id, SourceHandle::True) {
                            self.lower_from(target, emitter, &mut visited.clone());
                        }
                        emitter.begin_else();
                        if let Some(target) = self.graph.branch_target(&id, SourceHandle::False) {
                            self.lower_from(target, emitter, &mut visited.clone());
                        }
                        emitter.end_conditional();
                    }
                    ActionKind::Loop { count } => {
                        emitter.begin_loop(count.unwrap_or(DEFAULT_LOOP_COUNT), None);
                        if let Some(target) = self.graph.branch_target(&id, SourceHandle::Loop) {
                            self.lower_from(target, emitter, &mut visited.clone());
                        }
                        emitter.end_loop();
                    }
                    ActionKind::ForEach { iterator, count } => {
                        emitter.begin_loop(count.unwrap_or(DEFAULT_LOOP_COUNT), Some(iterator));
                        if let Some(target) = self.graph.branch_target(&id, SourceHandle::Loop) {
                            self.lower_from(target, emitter, &mut visited.clone());
                        }
                        emitter.end_loop();
                    }
                    ActionKind::Parallel => {
                        emitter.begin_parallel();
                        for (index, handle) in SourceHandle::ACTIONS.iter().enumerate() {
                            if let Some(target) = self.graph.branch_target(&id, *handle) {
                                emitter.parallel_branch(index as u8 + 1);
                                self.lower_from(target, emitter, &mut visited.clone());
                            }
                        }
                        emitter.end_parallel();
                    }
                    other => emitter.emit_action(other, combined.as_ref()),
                },
            }

            current = self.graph.next_target(&id).map(str::to_string);
        }
    }
}
