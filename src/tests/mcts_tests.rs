use std::collections::HashSet;
use std::time::Duration;

use board_game_traits::Color;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::Bernoulli;

use crate::position::Move;
use crate::rules::{ConnectRules, Rules};
use crate::search::{MctsPlayer, MctsSetting, Tree};
use crate::tests::state;

fn mcts_player(clock: Duration, settings: MctsSetting) -> MctsPlayer<ConnectRules, Duration> {
    MctsPlayer::from_seed(ConnectRules::new(3), Color::White, clock, settings, 0)
}

#[test]
fn fast_path_plays_immediate_win_test() {
    // Both sides threaten a row; the engine's own win takes priority over the
    // block, and no search time is needed at all.
    let position = state("XX./OO./...");
    let mut player = mcts_player(Duration::ZERO, MctsSetting::default());
    assert_eq!(player.choose_move(&position), Move::new(0, 2));
}

#[test]
fn fast_path_blocks_opponent_win_test() {
    let position = state("X../OO./X..");
    let mut player = mcts_player(Duration::ZERO, MctsSetting::default());
    assert_eq!(player.choose_move(&position), Move::new(1, 2));
}

#[test]
fn single_legal_move_test() {
    let position = state("XOX/OXO/OX.");
    let only_move = Move::new(2, 2);

    let mut player = mcts_player(Duration::ZERO, MctsSetting::default());
    assert_eq!(player.choose_move(&position), only_move);

    let mut player = mcts_player(Duration::from_millis(50), MctsSetting::default());
    assert_eq!(player.choose_move(&position), only_move);
}

#[test]
fn zero_budget_returns_legal_move_test() {
    let position = state("X../.O./...");
    let legal = ConnectRules::new(3).valid_moves(&position);
    for seed in 0..8 {
        let mut player = MctsPlayer::from_seed(
            ConnectRules::new(3),
            Color::White,
            Duration::ZERO,
            MctsSetting::default(),
            seed,
        );
        let chosen = player.choose_move(&position);
        assert!(legal.contains(&chosen), "{} is not legal", chosen);
    }
}

#[test]
fn chooses_legal_moves_test() {
    let rules = ConnectRules::new(3);
    for rows in ["X../..O/...", ".../.../...", "XO./O../..X"] {
        let position = state(rows);
        let legal = rules.valid_moves(&position);
        let mut player = mcts_player(
            Duration::from_millis(100),
            MctsSetting::default().max_iterations(200),
        );
        let chosen = player.choose_move(&position);
        assert!(
            legal.contains(&chosen),
            "{} is not legal on\n{}",
            chosen,
            position
        );
    }
}

#[test]
fn deterministic_with_seed_test() {
    // No immediate win for either side, so the full search runs; the
    // iteration cap ends it before the generous clock does.
    let position = state("X../..O/...");
    let settings = MctsSetting::default().max_iterations(30);
    let mut first = mcts_player(Duration::from_secs(10), settings);
    let mut second = mcts_player(Duration::from_secs(10), settings);
    assert_eq!(first.choose_move(&position), second.choose_move(&position));
}

#[test]
fn tree_invariants_test() {
    let rules = ConnectRules::new(3);
    let root_state = state("X../..O/...");
    let legal_root = rules.valid_moves(&root_state);

    let mut rng = SmallRng::seed_from_u64(3);
    let coin = Bernoulli::new(0.5).unwrap();
    let mut tree = Tree::new(&rules, root_state);
    let mut origins = vec![0u32; 1];

    let iterations = 60;
    for _ in 0..iterations {
        let selected = tree.select(1.2);
        let node = if tree.is_terminal(selected) {
            selected
        } else {
            tree.expand(selected, Color::White, &mut rng)
        };
        let result = tree.rollout(node, Color::White, &coin, &mut rng);
        assert!((0.0..=1.0).contains(&result));
        tree.backpropagate(node, result);

        origins.resize(tree.len(), 0);
        origins[node] += 1;
    }

    let nodes = tree.nodes();
    assert_eq!(nodes[0].visits, iterations);
    assert!(tree.len() > 1);

    for (index, node) in nodes.iter().enumerate() {
        // Every rollout that passed through this node is accounted for: its
        // own simulations plus those of its whole subtree.
        let child_visits: u32 = node.children.iter().map(|&child| nodes[child].visits).sum();
        assert_eq!(node.visits, child_visits + origins[index]);
        assert!(node.wins <= node.visits as f64);

        // Untried moves and children's moves partition the legal moves.
        let legal: HashSet<Move> = rules.valid_moves(&node.state).into_iter().collect();
        let mut seen: HashSet<Move> = HashSet::new();
        for &mv in &node.untried_moves {
            assert!(seen.insert(mv), "{} both tried and untried", mv);
        }
        for &child in &node.children {
            let mv = nodes[child].mv.expect("non-root node without a move");
            assert!(seen.insert(mv), "{} expanded twice", mv);
        }
        assert_eq!(seen, legal);
    }

    // The root's untried moves started out as the full legal move set.
    let root_children: usize = nodes[0].children.len();
    assert_eq!(root_children + nodes[0].untried_moves.len(), legal_root.len());
}

#[test]
fn terminal_node_is_never_rolled_out_past_a_full_board_test() {
    // A drawn, full board: the root is terminal, selection stays there, no
    // child is ever created, and the rollout reports a draw immediately.
    let rules = ConnectRules::new(3);
    let mut tree = Tree::new(&rules, state("XOX/OXO/OXO"));
    let mut rng = SmallRng::seed_from_u64(0);
    let coin = Bernoulli::new(0.5).unwrap();

    let selected = tree.select(1.2);
    assert_eq!(selected, 0);
    assert!(tree.is_terminal(selected));

    let result = tree.rollout(selected, Color::White, &coin, &mut rng);
    assert_eq!(result, 0.5);

    tree.backpropagate(selected, result);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.visits(), 1);
}

#[test]
fn winning_producing_move_is_terminal_for_either_identity_test() {
    let rules = ConnectRules::new(3);
    let mut rng = SmallRng::seed_from_u64(1);

    // Expand until the tree contains a child whose producing move completed a
    // white row; that node must be terminal even though moves remain.
    let mut tree = Tree::new(&rules, state("XX./OO./..."));
    let winning_child = loop {
        let selected = tree.select(1.2);
        let node = if tree.is_terminal(selected) {
            selected
        } else {
            tree.expand(selected, Color::White, &mut rng)
        };
        tree.backpropagate(node, 0.5);
        if tree.nodes()[node].mv == Some(Move::new(0, 2)) {
            break node;
        }
    };
    assert!(tree.is_terminal(winning_child));
    assert!(!rules
        .valid_moves(&tree.nodes()[winning_child].state)
        .is_empty());
}
