use hmm_viterbi::{Decoder, HmmModel};

/// A and B are interchangeable: same initial mass, same transition rows,
/// same emissions. Every comparison between them is an exact tie.
fn twins(order: [char; 3]) -> HmmModel<char, char> {
    HmmModel::builder(order)
        .with_initial([('A', 0.4), ('B', 0.4), ('C', 0.2)])
        .with_transition(order.map(|from| (from, vec![('A', 0.45), ('B', 0.45), ('C', 0.1)])))
        .with_emission([
            ('A', vec![('x', 0.7), ('y', 0.3)]),
            ('B', vec![('x', 0.7), ('y', 0.3)]),
            ('C', vec![('x', 0.1), ('y', 0.9)]),
        ])
        .build()
        .unwrap()
}

#[test]
fn first_declared_state_wins_ties() {
    let obs = ['x', 'x', 'x', 'x'];
    let decoding = Decoder::default().decode(&twins(['A', 'B', 'C']), &obs).unwrap();
    assert_eq!(decoding.path(), &['A', 'A', 'A', 'A']);

    let trellis = decoding.trellis();
    for row in trellis.rows() {
        assert_eq!(row[0].to_bits(), row[1].to_bits(), "A and B must tie exactly");
    }
}

#[test]
fn declared_order_decides_not_identity() {
    let obs = ['x', 'x', 'x', 'x'];
    let decoding = Decoder::default().decode(&twins(['B', 'A', 'C']), &obs).unwrap();
    assert_eq!(decoding.path(), &['B', 'B', 'B', 'B']);

    let decoding = Decoder::default().decode(&twins(['C', 'B', 'A']), &obs).unwrap();
    assert_eq!(decoding.path(), &['B', 'B', 'B', 'B']);
}

#[test]
fn tie_break_is_stable_across_runs() {
    let model = twins(['A', 'B', 'C']);
    let obs = ['x', 'y', 'x', 'y', 'y', 'x'];
    let first = Decoder::default().decode(&model, &obs).unwrap();
    for _ in 0..10 {
        let again = Decoder::default().decode(&model, &obs).unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn final_state_tie_picks_first() {
    // Both states score the same at every step; the last row ties too.
    let model = HmmModel::from_dense(
        vec![1u8, 0],
        vec!['z'],
        vec![0.5, 0.5],
        vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        vec![vec![1.0], vec![1.0]],
    )
    .unwrap();
    let decoding = Decoder::default().decode(&model, &['z', 'z', 'z']).unwrap();
    assert_eq!(decoding.path(), &[1, 1, 1]);
    assert_eq!(decoding.state_indices(), &[0, 0, 0]);
    assert_eq!(model.state_index(&decoding.path()[0]), Some(0));
}

#[test]
fn products_equal_in_linear_space_tie_in_the_log_domain() {
    // 0.3 * 0.8 and 0.4 * 0.6 are the same double; their log sums are not.
    assert_eq!(0.3f64 * 0.8, 0.4 * 0.6);
    assert_ne!(0.3f64.ln() + 0.8f64.ln(), 0.4f64.ln() + 0.6f64.ln());

    let model = HmmModel::from_dense(
        vec!['A', 'B', 'C'],
        vec!['x', 'y'],
        vec![0.3, 0.4, 0.3],
        vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
        vec![vec![0.8, 0.2], vec![0.6, 0.4], vec![0.1, 0.9]],
    )
    .unwrap();
    let decoding = Decoder::default().decode(&model, &['x']).unwrap();
    assert_eq!(decoding.path(), &['A']);
    assert_eq!(decoding.trellis().column_argmax(), vec!['A']);
}

#[test]
fn predecessor_tie_survives_log_rounding() {
    // From A: 0.3 * 0.8, from B: 0.4 * 0.6. Both reach A with the same mass.
    let model = HmmModel::from_dense(
        vec!['A', 'B', 'C'],
        vec!['x', 'y'],
        vec![0.3, 0.4, 0.3],
        vec![vec![0.8, 0.2, 0.0], vec![0.6, 0.4, 0.0], vec![0.0, 0.0, 1.0]],
        vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
    )
    .unwrap();
    let decoding = Decoder::default().decode(&model, &['x', 'x']).unwrap();
    assert_eq!(decoding.path(), &['A', 'A']);
    assert!((decoding.probability() - 0.24).abs() < 1e-12);
}
