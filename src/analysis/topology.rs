use crate::error::{ModelError, Result};
use crate::store::BlockRegistry;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

/// Orders blocks so that every producer appears before its consumers.
///
/// Edges run producer -> consumer. Variables nobody produces (unknowns, shocks,
/// constants) add no edges.
pub fn sort(registry: &BlockRegistry) -> Result<Vec<usize>> {
    let count = registry.count();
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(count, count * 2);
    let nodes: Vec<NodeIndex> = (0..count).map(|i| graph.add_node(i)).collect();

    for (i, &node) in nodes.iter().enumerate() {
        for parent in registry.get_parents(i) {
            graph.add_edge(nodes[parent], node, ());
        }
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(|n| graph[n]).collect())
        .map_err(|cycle| {
            let idx = graph[cycle.node_id()];
            ModelError::CycleDetected(registry.get(idx).name().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Block, ModelBlock, Point};

    fn noop(_: &Point<'_>) -> Result<Vec<f64>> { Ok(vec![0.0]) }

    fn explicit(name: &'static str, out: &'static str, inputs: &[&'static str]) -> ModelBlock {
        Block::explicit(name, &[out], noop).inputs_now(inputs).into()
    }

    #[test]
    fn test_sort_diamond_dependency() {
        // Shape: A -> B, A -> C, B+C -> D
        let mut reg = BlockRegistry::new();
        let d = reg.add(explicit("D", "d", &["b", "c"])).unwrap();
        let b = reg.add(explicit("B", "b", &["a"])).unwrap();
        let c = reg.add(explicit("C", "c", &["a"])).unwrap();
        let a = reg.add(explicit("A", "a", &["x"])).unwrap();

        let res = sort(&reg).expect("Sort failed");

        let pos = |id: usize| res.iter().position(|&x| x == id).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(a) < pos(c));
        assert!(pos(b) < pos(d));
        assert!(pos(c) < pos(d));
    }

    #[test]
    fn test_cycle_detection_explicit() {
        let mut reg = BlockRegistry::new();
        reg.add(explicit("A", "a", &["b"])).unwrap();
        reg.add(explicit("B", "b", &["a"])).unwrap();

        let err = sort(&reg).unwrap_err();
        assert!(err.to_string().contains("Cycle detected"), "Msg: {}", err);
    }

    #[test]
    fn test_implicit_block_does_not_depend_on_itself() {
        // The unknown is read at a lag but produced by the same block.
        let mut reg = BlockRegistry::new();
        let wage = Block::implicit("wage", "w", (-10.0, 10.0), &["wage_resid"], noop)
            .unknown_at(crate::store::Shift::Fixed(-1))
            .input("N", 0);
        reg.add(wage.into()).unwrap();
        assert_eq!(sort(&reg).unwrap(), vec![0]);
    }
}
