//! Fruchterman-Reingold spring layout for small weighted graphs.

use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Optimal distance between nodes; larger values spread the graph.
    pub k: f64,
    pub iterations: usize,
    /// Stop once the mean node step falls below this.
    pub threshold: f64,
    /// Seed for the initial positions.
    pub seed: u64,
    /// Half-width of the output box.
    pub scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            k: 2.0,
            iterations: 50,
            threshold: 1e-4,
            seed: 42,
            scale: 1.0,
        }
    }
}

/// Positions for every node, indexed by `NodeIndex::index()`, centred on the
/// origin and scaled so the largest coordinate magnitude is `config.scale`.
pub fn spring_layout<N>(graph: &UnGraph<N, f64>, config: &LayoutConfig) -> Vec<[f64; 2]> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![[0.0, 0.0]],
        _ => {}
    }

    let mut adjacency = vec![vec![0.0; n]; n];
    for edge in graph.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        adjacency[a][b] = *edge.weight();
        adjacency[b][a] = *edge.weight();
    }

    let mut rng = fastrand::Rng::with_seed(config.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.f64(), rng.f64()]).collect();

    let k = config.k;
    let mut t = extent(&pos, 0).max(extent(&pos, 1)) * 0.1;
    let dt = t / (config.iterations as f64 + 1.0);
    let mut displacement = vec![[0.0; 2]; n];

    for _ in 0..config.iterations {
        for i in 0..n {
            let mut d = [0.0; 2];
            for j in (0..n).filter(|&j| j != i) {
                let delta = [pos[i][0] - pos[j][0], pos[i][1] - pos[j][1]];
                let distance = delta[0].hypot(delta[1]).max(0.01);
                // repulsion minus weighted attraction
                let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                d[0] += delta[0] * force;
                d[1] += delta[1] * force;
            }
            displacement[i] = d;
        }

        let mut moved = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = d[0].hypot(d[1]).max(0.01);
            let step = [d[0] * t / length, d[1] * t / length];
            p[0] += step[0];
            p[1] += step[1];
            moved += step[0].hypot(step[1]);
        }
        t -= dt;
        if moved / (n as f64) < config.threshold {
            break;
        }
    }

    rescale(&mut pos, config.scale);
    pos
}

fn extent(pos: &[[f64; 2]], axis: usize) -> f64 {
    let (min, max) = pos
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
    max - min
}

fn rescale(pos: &mut [[f64; 2]], scale: f64) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }
    let lim = pos
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0, f64::max);
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] *= scale / lim;
            p[1] *= scale / lim;
        }
    }
}
