//! End-to-end scenarios: board rules, UCT selection and engine decisions.

use mcts::config::OutcomeValues;
use mcts::position::{Outcome, Position, Side, Status};
use mcts::tree::SearchTree;
use mcts::uct::select_best_child;
use mcts::{Engine, EngineConfig, GameState};

#[test]
fn test_empty_board_has_seven_moves() {
    let state = GameState::new(Position::new(), Side::A);
    assert_eq!(state.position().legal_columns(), vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(state.successors().len(), 7);
}

#[test]
fn test_full_columns_are_not_legal() {
    let mut state = GameState::new(Position::new(), Side::A);
    for column in [2, 3] {
        for _ in 0..6 {
            state.play(column).expect("column has room");
        }
    }
    assert_eq!(state.position().legal_columns(), vec![0, 1, 4, 5, 6]);
    let columns: Vec<usize> = state.successors().iter().map(|(c, _)| *c).collect();
    assert_eq!(columns, vec![0, 1, 4, 5, 6]);
}

#[test]
fn test_four_in_bottom_row_wins() {
    let mut position = Position::new();
    for column in 0..4 {
        assert_eq!(mcts::apply_move(&mut position, Side::B, column), Ok(5));
    }
    assert_eq!(position.status(), Status::Win(Side::B));
}

#[test]
fn test_unvisited_child_selected_first() {
    let values = OutcomeValues::default();
    let root_state = GameState::new(Position::new(), Side::A);
    let mut tree = SearchTree::new(root_state);
    let root = tree.root();
    let children: Vec<_> = (0..3)
        .map(|column| {
            let state = root_state.successor(column).expect("legal column");
            tree.add_child(root, column, state).expect("room for child")
        })
        .collect();

    tree.backpropagate(children[0], Outcome::Win(Side::A));
    tree.backpropagate(children[1], Outcome::Win(Side::A));
    tree.backpropagate(children[1], Outcome::Draw);

    for exploration in [0.0, 1.0, std::f64::consts::SQRT_2, 10.0] {
        assert_eq!(
            select_best_child(&tree, root, &values, exploration),
            Some(children[2]),
            "exploration {exploration}"
        );
    }
}

fn win_frequency(position: Position, side: Side, winning_column: usize, runs: u64) -> u64 {
    (0..runs)
        .filter(|&seed| {
            let config = EngineConfig::default().with_iterations(1500).with_seed(seed);
            let engine = Engine::new(config).expect("valid config");
            let decision = engine
                .decide(&GameState::new(position, side))
                .expect("position in progress");
            println!("seed {seed}: column {}", decision.column);
            decision.column == winning_column
        })
        .count() as u64
}

#[test]
fn test_side_a_finds_single_winning_column() {
    let position: Position = "
        .......
        .......
        .......
        .......
        BBB....
        AAA....
    "
    .parse()
    .expect("valid board");

    let hits = win_frequency(position, Side::A, 3, 12);
    assert!(hits >= 10, "winning column chosen only {hits}/12 times");
}

#[test]
fn test_side_b_finds_single_winning_column() {
    let position: Position = "
        .......
        .......
        .......
        A......
        A...A..
        BBB.A..
    "
    .parse()
    .expect("valid board");

    let hits = win_frequency(position, Side::B, 3, 12);
    assert!(hits >= 10, "winning column chosen only {hits}/12 times");
}

#[test]
fn test_decide_move_entry_point() {
    let mut position = Position::new();
    mcts::apply_move(&mut position, Side::A, 3).expect("legal");
    let column = mcts::decide_move(&position, Side::B, 400).expect("in progress");
    assert!(position.is_legal(column));
}

#[test]
fn test_tactics_are_exact() {
    let position: Position = "
        .......
        .......
        .......
        .......
        BBB....
        AAA....
    "
    .parse()
    .expect("valid board");

    let engine = Engine::new(EngineConfig::default().with_immediate_tactics(true)).expect("valid config");
    for _ in 0..5 {
        let decision = engine.decide(&GameState::new(position, Side::A)).expect("in progress");
        assert_eq!(decision.column, 3);
        assert_eq!(decision.source, mcts::DecisionSource::ImmediateWin);
    }

    // B to move cannot win but must stop A.
    let decision = engine.decide(&GameState::new(position, Side::B)).expect("in progress");
    assert_eq!(decision.column, 3);
    assert_eq!(decision.source, mcts::DecisionSource::ForcedBlock);
}
