//! End-to-end session scenarios driven through the byte-level API.

use rand::SeedableRng;
use rand::rngs::StdRng;
use ttts::{
    Action, Cell, Command, Message, Outcome, Player, Position, Session, evaluate, process_bytes,
};

fn send(session: &mut Session, msg: Message, rng: &mut StdRng) -> Vec<Action> {
    process_bytes(session, &msg.encode(), rng)
}

/// Session 0 after NEWGAME where the server left the center open.
fn game_with_open_center() -> (Session, StdRng) {
    for seed in 0u64.. {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut session = Session::new(0);
        send(&mut session, Message::new(Command::NewGame, 0, 0, 0), &mut rng);
        if session.board().is_open(Position::Center) {
            return (session, rng);
        }
    }
    unreachable!("some seed leaves the center open")
}

#[test]
fn test_scenario_newgame() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = Session::new(0);

    let actions = send(&mut session, Message::new(Command::NewGame, 0, 0, 0), &mut rng);

    let [Action::Reply(reply)] = actions.as_slice() else {
        panic!("expected one reply, got {actions:?}");
    };
    assert_eq!(reply.command, Command::Move);
    assert!((1..=9).contains(&reply.position));
    let pos = Position::from_number(reply.position).unwrap();
    assert_eq!(session.board().get(pos), Cell::Marked(Player::X));
    assert_eq!(session.board().open_positions().len(), 8);
    assert_eq!(session.current_seq(), 1);
    assert!(session.in_progress());
}

#[test]
fn test_scenario_client_move() {
    let (mut session, mut rng) = game_with_open_center();

    let actions = send(&mut session, Message::new(Command::Move, 5, 0, 2), &mut rng);

    assert_eq!(session.board().get(Position::Center), Cell::Marked(Player::O));
    assert_eq!(session.current_seq(), 3);
    let [Action::Reply(reply)] = actions.as_slice() else {
        panic!("expected one reply, got {actions:?}");
    };
    assert_eq!(reply.seq, 3);
    assert!(matches!(reply.command, Command::Move | Command::GameOver));
}

#[test]
fn test_scenario_occupied_cell_abandons() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut session = Session::new(0);
    let actions = send(&mut session, Message::new(Command::NewGame, 0, 0, 0), &mut rng);
    let [Action::Reply(first)] = actions.as_slice() else {
        panic!("expected one reply, got {actions:?}");
    };

    let actions = send(
        &mut session,
        Message::new(Command::Move, first.position, 0, 2),
        &mut rng,
    );

    assert_eq!(actions, vec![Action::Close]);
    assert!(!session.in_progress());
}

#[test]
fn test_scenario_resume_board() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut session = Session::new(0);
    let mut bytes = Message::new(Command::Resume, 0, 0, 8).encode().to_vec();
    bytes.extend_from_slice(b"XOXOXOXO1");

    let actions = process_bytes(&mut session, &bytes, &mut rng);

    assert_eq!(session.board().get(Position::BottomRight), Cell::Open(Position::BottomRight));
    assert_eq!(session.board().get(Position::TopLeft), Cell::Marked(Player::X));
    assert_eq!(session.board().get(Position::TopCenter), Cell::Marked(Player::O));
    // X already holds the 3-5-7 diagonal, so the answer is GAMEOVER.
    assert_eq!(evaluate(session.board()), Outcome::Won(Player::X));
    assert_eq!(
        actions,
        vec![
            Action::Nothing,
            Action::Reply(Message::new(Command::GameOver, 0, 0, 9))
        ]
    );
    assert!(!session.in_progress());
}

#[test]
fn test_resume_board_split_across_reads() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut session = Session::new(0);
    let mut bytes = Message::new(Command::Resume, 0, 0, 2).encode().to_vec();
    bytes.extend_from_slice(b"X2O456789");

    let mut actions = Vec::new();
    for chunk in bytes.chunks(4) {
        actions.extend(process_bytes(&mut session, chunk, &mut rng));
    }

    let Some(Action::Reply(reply)) = actions.last().copied() else {
        panic!("expected a reply, got {actions:?}");
    };
    assert_eq!(reply.command, Command::Move);
    assert_eq!(reply.seq, 3);
    let pos = Position::from_number(reply.position).unwrap();
    assert!(![Position::TopLeft, Position::TopRight].contains(&pos));
    assert_eq!(session.board().get(pos), Cell::Marked(Player::X));
}
