use narwhal::{Force, ManyBody, Node, RandomSource, XorShift64Star};

fn scattered(seed: u64, n: usize, span: f64) -> Vec<Node> {
    let mut rng = XorShift64Star::new(seed);
    (0..n)
        .map(|i| {
            let x = rng.next_f64() * span;
            let y = rng.next_f64() * span;
            let mut node = Node::new(x, y).velocity(0.0, 0.0);
            node.index = i;
            node
        })
        .collect()
}

/// Direct pairwise sum with the same minimum-distance clamp the force uses.
fn brute_force(nodes: &[Node], strength: f64, alpha: f64) -> Vec<(f64, f64)> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let mut dvx = 0.0;
            let mut dvy = 0.0;
            for (j, b) in nodes.iter().enumerate() {
                if i == j {
                    continue;
                }
                let x = b.x - a.x;
                let y = b.y - a.y;
                let mut l = x * x + y * y;
                if l < 1.0 {
                    l = l.sqrt();
                }
                dvx += x * strength * alpha / l;
                dvy += y * strength * alpha / l;
            }
            (dvx, dvy)
        })
        .collect()
}

fn apply(force: &mut ManyBody<()>, nodes: &mut [Node], alpha: f64) {
    force.initialize(nodes).expect("many-body initializes");
    force.apply(nodes, alpha, &mut XorShift64Star::new(99));
}

#[test]
fn vanishing_theta_matches_pairwise_sum() {
    for seed in [1, 2, 3] {
        let mut nodes = scattered(seed, 5, 100.0);
        let expected = brute_force(&nodes, -30.0, 1.0);

        let mut force = ManyBody::new().theta(1e-6);
        apply(&mut force, &mut nodes, 1.0);

        for (node, (ex, ey)) in nodes.iter().zip(&expected) {
            let tol = 1e-9 * ex.abs().max(ey.abs()).max(1.0);
            assert!(
                (node.vx - ex).abs() < tol && (node.vy - ey).abs() < tol,
                "seed {seed} node {}: got ({}, {}), want ({ex}, {ey})",
                node.index,
                node.vx,
                node.vy
            );
        }
    }
}

#[test]
fn default_theta_approximates_pairwise_sum() {
    let mut nodes = scattered(17, 200, 1000.0);
    let expected = brute_force(&nodes, -30.0, 0.5);

    let mut force = ManyBody::new();
    apply(&mut force, &mut nodes, 0.5);

    let mut err = 0.0;
    let mut norm = 0.0;
    for (node, (ex, ey)) in nodes.iter().zip(&expected) {
        err += (node.vx - ex).powi(2) + (node.vy - ey).powi(2);
        norm += ex.powi(2) + ey.powi(2);
    }
    let relative = (err / norm).sqrt();
    assert!(relative < 0.25, "relative error {relative}");
}

#[test]
fn repulsion_pushes_a_pair_apart() {
    let mut nodes = vec![
        Node::new(0.0, 0.0).velocity(0.0, 0.0),
        Node::new(10.0, 0.0).velocity(0.0, 0.0),
    ];
    nodes[1].index = 1;

    let mut force = ManyBody::new();
    apply(&mut force, &mut nodes, 1.0);

    // -30 * 10 / 100 on each, in opposite directions.
    assert!((nodes[0].vx + 3.0).abs() < 1e-12, "vx0 = {}", nodes[0].vx);
    assert!((nodes[1].vx - 3.0).abs() < 1e-12, "vx1 = {}", nodes[1].vx);
}

#[test]
fn fixed_nodes_are_not_pushed_but_still_push() {
    let mut nodes = vec![
        Node::new(0.0, 0.0).velocity(0.0, 0.0).frozen(),
        Node::new(10.0, 0.0).velocity(0.0, 0.0),
    ];
    nodes[1].index = 1;

    let mut force = ManyBody::new();
    apply(&mut force, &mut nodes, 1.0);

    assert_eq!((nodes[0].vx, nodes[0].vy), (0.0, 0.0));
    assert!(nodes[1].vx > 0.0);
}

#[test]
fn distance_max_ignores_far_bodies() {
    let mut nodes = vec![
        Node::new(0.0, 0.0).velocity(0.0, 0.0),
        Node::new(500.0, 0.0).velocity(0.0, 0.0),
    ];
    nodes[1].index = 1;

    let mut force = ManyBody::new().distance_max(100.0);
    apply(&mut force, &mut nodes, 1.0);

    assert_eq!(nodes[0].vx, 0.0);
    assert_eq!(nodes[1].vx, 0.0);
}

#[test]
fn coincident_nodes_get_finite_velocities() {
    let mut nodes: Vec<Node> = (0..6)
        .map(|i| {
            let mut n = Node::new(5.0, 5.0).velocity(0.0, 0.0);
            n.index = i;
            n
        })
        .collect();

    let mut force = ManyBody::new();
    apply(&mut force, &mut nodes, 1.0);

    for n in &nodes {
        assert!(n.vx.is_finite() && n.vy.is_finite(), "node {n:?}");
    }
}
