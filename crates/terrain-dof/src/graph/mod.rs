//! Render graph with dependency-driven pass ordering
//!
//! Passes declare the targets they write and sample. The graph orders them so
//! every writer runs before its readers and refuses to build when a pass
//! samples its own output, when two passes write the same target or when the
//! dependencies form a cycle.

mod pass;
mod recording;
mod resource;

pub use pass::{FrameContext, RenderPass};
pub use recording::{DrawItem, Geometry, PassRecorder, PassRecording};
pub use resource::{PassId, TargetId};

use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};

/// Render graph for automatic pass ordering
pub struct RenderGraph {
    passes: Vec<PassNode>,
    execution_order: Vec<usize>,
    built: bool,
}

struct PassNode {
    pass: Box<dyn RenderPass>,
    reads: Vec<TargetId>,
    writes: Vec<TargetId>,
    after: Vec<String>,
}

impl PassNode {
    fn target(&self) -> Result<TargetId> {
        match self.writes.as_slice() {
            [target] => Ok(*target),
            writes => Err(Error::Graph(format!(
                "pass '{}' must write exactly one target, declares {}",
                self.pass.name(),
                writes.len()
            ))),
        }
    }
}

impl RenderGraph {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            execution_order: Vec::new(),
            built: false,
        }
    }

    /// Add a pass to the graph
    pub fn add_pass(&mut self, pass: impl RenderPass + 'static) -> PassId {
        let id = PassId(self.passes.len());

        // Get resource declarations from the pass
        let mut builder = PassResourceBuilder::new();
        pass.declare_resources(&mut builder);

        self.passes.push(PassNode {
            pass: Box::new(pass),
            reads: builder.reads,
            writes: builder.writes,
            after: builder.after,
        });
        self.built = false;
        id
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Build the graph - validate declarations and determine execution order
    pub fn build(&mut self) -> Result<()> {
        log::info!("Building render graph with {} passes", self.passes.len());

        let mut writers: HashMap<TargetId, usize> = HashMap::new();
        for (i, node) in self.passes.iter().enumerate() {
            let target = node.target()?;
            if !target.is_valid() {
                return Err(Error::Graph(format!(
                    "pass '{}' writes unknown target {:?}",
                    node.pass.name(),
                    target
                )));
            }
            if node.reads.contains(&target) {
                return Err(Error::Graph(format!(
                    "pass '{}' samples {:?}, which it also writes",
                    node.pass.name(),
                    target
                )));
            }
            if let Some(&other) = writers.get(&target) {
                return Err(Error::Graph(format!(
                    "{:?} is written by both '{}' and '{}'",
                    target,
                    self.passes[other].pass.name(),
                    node.pass.name()
                )));
            }
            writers.insert(target, i);
        }

        let names: HashMap<&str, usize> = self
            .passes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.pass.name(), i))
            .collect();

        // Edges run from each writer (or named predecessor) to the dependent pass
        let mut in_degree = vec![0; self.passes.len()];
        let mut adj_list: Vec<Vec<usize>> = vec![Vec::new(); self.passes.len()];

        for (i, node) in self.passes.iter().enumerate() {
            for read in &node.reads {
                if !read.is_sampleable() {
                    return Err(Error::Graph(format!(
                        "pass '{}' samples {:?}, which cannot be sampled",
                        node.pass.name(),
                        read
                    )));
                }
                let writer = writers.get(read).copied().ok_or_else(|| {
                    Error::Graph(format!(
                        "pass '{}' samples {:?}, which no pass writes",
                        node.pass.name(),
                        read
                    ))
                })?;
                adj_list[writer].push(i);
                in_degree[i] += 1;
            }
            for name in &node.after {
                let before = names.get(name.as_str()).copied().ok_or_else(|| {
                    Error::Graph(format!(
                        "pass '{}' runs after unknown pass '{}'",
                        node.pass.name(),
                        name
                    ))
                })?;
                adj_list[before].push(i);
                in_degree[i] += 1;
            }
        }

        // Topological sort (Kahn's algorithm, FIFO to preserve insertion order)
        let mut queue: VecDeque<usize> = (0..self.passes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.passes.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);

            for &neighbor in &adj_list[node] {
                in_degree[neighbor] -= 1;
                if in_degree[neighbor] == 0 {
                    queue.push_back(neighbor);
                }
            }
        }

        // Check for cycles
        if order.len() != self.passes.len() {
            return Err(Error::Graph(
                "Cyclic dependency detected in render graph".to_string(),
            ));
        }

        self.execution_order = order;
        self.built = true;

        for (i, &pass_idx) in self.execution_order.iter().enumerate() {
            log::debug!("  Pass {}: {}", i, self.passes[pass_idx].pass.name());
        }

        log::info!(
            "Render graph built: {}",
            self.execution_order().join(" -> ")
        );
        Ok(())
    }

    /// Pass names in the order they execute
    pub fn execution_order(&self) -> Vec<&str> {
        self.execution_order
            .iter()
            .map(|&i| self.passes[i].pass.name())
            .collect()
    }

    /// Target written by the named pass
    pub fn target_of(&self, name: &str) -> Option<TargetId> {
        self.passes
            .iter()
            .find(|node| node.pass.name() == name)
            .and_then(|node| node.target().ok())
    }

    /// Record every pass of a frame in execution order
    pub fn record(&self, frame: &FrameContext<'_>) -> Result<Vec<PassRecording>> {
        if !self.built {
            return Err(Error::Graph("render graph recorded before build".to_string()));
        }
        log::trace!("Recording render graph ({} passes)", self.execution_order.len());

        let mut recorder = PassRecorder::new();
        for &pass_idx in &self.execution_order {
            let node = &self.passes[pass_idx];
            let target = node.target()?;
            recorder.begin(node.pass.name(), target, node.pass.clear_color(frame));
            node.pass.record(frame, &mut recorder)?;

            if let Some(recording) = recorder.current() {
                Self::check_sampling(node, recording)?;
            }
        }
        Ok(recorder.finish())
    }

    /// Every target a draw samples must be a declared read of its pass
    fn check_sampling(node: &PassNode, recording: &PassRecording) -> Result<()> {
        for draw in &recording.draws {
            for sampled in draw.kind().sampled_targets() {
                if !node.reads.contains(sampled) {
                    return Err(Error::Graph(format!(
                        "pass '{}' draws {} sampling undeclared {:?}",
                        node.pass.name(),
                        draw.kind().label(),
                        sampled
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for declaring pass resource dependencies
pub struct PassResourceBuilder {
    reads: Vec<TargetId>,
    writes: Vec<TargetId>,
    after: Vec<String>,
}

impl PassResourceBuilder {
    fn new() -> Self {
        Self {
            reads: Vec::new(),
            writes: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Declare that this pass samples a target
    pub fn read(&mut self, target: TargetId) -> &mut Self {
        self.reads.push(target);
        self
    }

    /// Declare the target this pass renders into
    pub fn write(&mut self, target: TargetId) -> &mut Self {
        self.writes.push(target);
        self
    }

    /// Order this pass after another one it shares no target with
    pub fn after(&mut self, pass: &str) -> &mut Self {
        self.after.push(pass.to_string());
        self
    }
}
