use std::collections::VecDeque;

/// Computes the betweenness centrality of every node of an unweighted, undirected graph.
///
/// Uses Brandes' algorithm: one breadth-first search per source node, followed by
/// back-propagation of pair dependencies. Each unordered pair of endpoints is
/// counted once, and the result is normalised by `2 / ((n - 1)(n - 2))` for graphs
/// with more than two nodes, so every score lies in `[0, 1]`.
///
/// `adjacency[i]` lists the neighbours of node `i`.
pub fn betweenness_centrality(adjacency: &[Vec<usize>]) -> Vec<f64> {
    let n = adjacency.len();
    let mut centrality = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut queue = VecDeque::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut distance = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];

    for source in 0..n {
        stack.clear();
        queue.clear();
        for node in 0..n {
            predecessors[node].clear();
            sigma[node] = 0.0;
            distance[node] = -1;
            delta[node] = 0.0;
        }
        sigma[source] = 1.0;
        distance[source] = 0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adjacency[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    // Every unordered pair was visited from both ends.
    let scale = if n > 2 {
        1.0 / ((n - 1) as f64 * (n - 2) as f64)
    } else {
        0.5
    };
    centrality.iter_mut().for_each(|c| *c *= scale);
    centrality
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn path(n: usize) -> Vec<Vec<usize>> {
        (0..n)
            .map(|i| {
                let mut neighbors = Vec::new();
                if i > 0 {
                    neighbors.push(i - 1);
                }
                if i + 1 < n {
                    neighbors.push(i + 1);
                }
                neighbors
            })
            .collect()
    }

    #[test]
    fn path_of_four_has_central_inner_nodes() {
        let c = betweenness_centrality(&path(4));
        // Inner nodes each lie on 2 of the 6 shortest paths; normalised by 3 * 2 / 2.
        assert!(approx(c[0], 0.0));
        assert!(approx(c[1], 2.0 / 3.0));
        assert!(approx(c[2], 2.0 / 3.0));
        assert!(approx(c[3], 0.0));
    }

    #[test]
    fn star_center_has_maximal_centrality() {
        let adjacency = vec![vec![1, 2, 3, 4], vec![0], vec![0], vec![0], vec![0]];
        let c = betweenness_centrality(&adjacency);
        assert!(approx(c[0], 1.0));
        assert!(c[1..].iter().all(|&x| approx(x, 0.0)));
    }

    #[test]
    fn ring_nodes_share_centrality_equally() {
        let adjacency = vec![vec![1, 3], vec![0, 2], vec![1, 3], vec![2, 0]];
        let c = betweenness_centrality(&adjacency);
        // In a 4-cycle each node carries half of the single opposite-pair path.
        for value in &c {
            assert!(approx(*value, c[0]));
        }
        assert!(approx(c[0], 0.5 / 3.0));
    }

    #[test]
    fn trivial_graphs_have_zero_centrality() {
        assert!(betweenness_centrality(&[]).is_empty());
        assert_eq!(betweenness_centrality(&[vec![]]), vec![0.0]);
        assert_eq!(betweenness_centrality(&[vec![1], vec![0]]), vec![0.0, 0.0]);
    }
}
