use std::sync::Arc;
use trivianight::protocol::{ClientMessage, ServerMessage};
use trivianight::state::AppState;
use trivianight::types::{Actor, FinalRoundStatus, RoundKey, RoundStatus};
use trivianight::ws::handlers::handle_message;

const QUIZ_CSV: &str = "\
Geography, Capital of France?, Paris
Geography, Capital of Japan?, Tokyo, Tokio
History, First US president?, George Washington, Washington
final round, Science, Chemical symbol for gold?, Au
";

async fn send(state: &Arc<AppState>, actor: &Actor, msg: ClientMessage) -> ServerMessage {
    handle_message(msg, actor, state)
        .await
        .expect("every command gets a reply")
}

fn assert_error(msg: ServerMessage, expected: &str) {
    match msg {
        ServerMessage::Error { code, .. } => assert_eq!(code, expected),
        other => panic!("Expected {} error, got {:?}", expected, other),
    }
}

/// End-to-end integration test for a complete game flow
#[tokio::test]
async fn test_full_game_flow() {
    let state = Arc::new(AppState::new());
    let staff = Actor::staff();
    let mut rx = state.broadcast.subscribe();

    // 1. Import the game
    let game = match send(
        &state,
        &staff,
        ClientMessage::StaffImportGame {
            title: "Friday Quiz".to_string(),
            csv: QUIZ_CSV.to_string(),
        },
    )
    .await
    {
        ServerMessage::GameImported { summary } => {
            assert_eq!(summary.rounds, 2);
            assert_eq!(summary.questions, 3);
            assert!(summary.has_final_round);
            summary.game
        }
        other => panic!("Expected GameImported, got {:?}", other),
    };

    // 2. Create and register players
    let tokens = match send(&state, &staff, ClientMessage::StaffCreatePlayers { count: 2 }).await {
        ServerMessage::PlayersCreated { players } => players,
        other => panic!("Expected PlayersCreated, got {:?}", other),
    };
    let alice = Actor::player(&tokens[0].id);
    let bob = Actor::player(&tokens[1].id);

    match send(
        &state,
        &alice,
        ClientMessage::RegisterPlayer {
            display_name: "Alice".to_string(),
        },
    )
    .await
    {
        ServerMessage::PlayerRegistered { display_name, .. } => assert_eq!(display_name, "Alice"),
        other => panic!("Expected PlayerRegistered, got {:?}", other),
    }

    // 3. Submissions before joining are refused
    let (rounds, final_round) = match send(
        &state,
        &alice,
        ClientMessage::GetGame {
            game_id: game.id.clone(),
        },
    )
    .await
    {
        ServerMessage::GameDetail {
            rounds,
            final_round,
            ..
        } => (rounds, final_round.expect("imported final round")),
        other => panic!("Expected GameDetail, got {:?}", other),
    };
    assert_eq!(rounds[0].category, "Geography");
    assert!(final_round.question.is_none());

    assert_error(
        send(
            &state,
            &alice,
            ClientMessage::ChooseDoubleRound {
                game_id: game.id.clone(),
                round_id: rounds[0].id.clone(),
            },
        )
        .await,
        "PERMISSION_DENIED",
    );

    for player in [&alice, &bob] {
        let reply = send(
            &state,
            player,
            ClientMessage::JoinGame {
                game_id: game.id.clone(),
            },
        )
        .await;
        assert!(matches!(reply, ServerMessage::Joined { .. }));
    }

    // 4. Alice doubles the first round
    let reply = send(
        &state,
        &alice,
        ClientMessage::ChooseDoubleRound {
            game_id: game.id.clone(),
            round_id: rounds[0].id.clone(),
        },
    )
    .await;
    assert!(matches!(reply, ServerMessage::DoubleRoundChosen { .. }));

    // 5. Round one: answer time
    send(
        &state,
        &staff,
        ClientMessage::StaffSetRoundStatus {
            round_id: rounds[0].id.clone(),
            status: RoundStatus::AnswerTime,
        },
    )
    .await;

    let questions = match send(
        &state,
        &bob,
        ClientMessage::GetRoundQuestions {
            round_id: rounds[0].id.clone(),
        },
    )
    .await
    {
        ServerMessage::RoundQuestions { questions, .. } => questions,
        other => panic!("Expected RoundQuestions, got {:?}", other),
    };
    assert_eq!(questions.len(), 2);
    let france = questions
        .iter()
        .find(|q| q.question.contains("France"))
        .unwrap();
    let japan = questions
        .iter()
        .find(|q| q.question.contains("Japan"))
        .unwrap();

    for (actor, question_id, text) in [
        (&alice, &france.id, "paris"),
        (&alice, &japan.id, " TOKIO "),
        (&bob, &france.id, "Paris"),
        (&bob, &japan.id, "Kyoto"),
    ] {
        let reply = send(
            &state,
            actor,
            ClientMessage::SubmitResponse {
                question_id: question_id.clone(),
                text: text.to_string(),
            },
        )
        .await;
        assert!(matches!(reply, ServerMessage::ResponseSaved { .. }));
    }

    // 6. Check answers: correct matches are marked automatically
    match send(
        &state,
        &staff,
        ClientMessage::StaffSetRoundStatus {
            round_id: rounds[0].id.clone(),
            status: RoundStatus::CheckAnswers,
        },
    )
    .await
    {
        ServerMessage::RoundUpdated { auto_checked, .. } => assert_eq!(auto_checked, 3),
        other => panic!("Expected RoundUpdated, got {:?}", other),
    }

    // Late answers are refused
    assert_error(
        send(
            &state,
            &bob,
            ClientMessage::SubmitResponse {
                question_id: japan.id.clone(),
                text: "Tokyo".to_string(),
            },
        )
        .await,
        "PERMISSION_DENIED",
    );

    let bob_kyoto = match send(
        &state,
        &bob,
        ClientMessage::GetMyResponses {
            round_id: rounds[0].id.clone(),
        },
    )
    .await
    {
        ServerMessage::MyResponses { responses, .. } => responses
            .into_iter()
            .find(|r| r.response == "Kyoto")
            .unwrap(),
        other => panic!("Expected MyResponses, got {:?}", other),
    };
    assert!(!bob_kyoto.correct);

    // Bob cannot mark their own answer, but Alice can
    assert_error(
        send(
            &state,
            &bob,
            ClientMessage::CheckResponse {
                response_id: bob_kyoto.id.clone(),
                correct: true,
            },
        )
        .await,
        "PERMISSION_DENIED",
    );
    match send(
        &state,
        &alice,
        ClientMessage::CheckResponse {
            response_id: bob_kyoto.id.clone(),
            correct: true,
        },
    )
    .await
    {
        ServerMessage::ResponseChecked { response } => assert!(response.correct),
        other => panic!("Expected ResponseChecked, got {:?}", other),
    }

    // Skipping back is not a legal transition
    assert_error(
        send(
            &state,
            &staff,
            ClientMessage::StaffSetRoundStatus {
                round_id: rounds[0].id.clone(),
                status: RoundStatus::AnswerTime,
            },
        )
        .await,
        "INVALID_TRANSITION",
    );

    send(
        &state,
        &staff,
        ClientMessage::StaffSetRoundStatus {
            round_id: rounds[0].id.clone(),
            status: RoundStatus::Closed,
        },
    )
    .await;

    match send(
        &state,
        &alice,
        ClientMessage::GetRoundReview {
            round_id: rounds[0].id.clone(),
        },
    )
    .await
    {
        ServerMessage::RoundReview { review } => assert_eq!(review.responses.len(), 4),
        other => panic!("Expected RoundReview, got {:?}", other),
    }

    // 7. Round two
    send(
        &state,
        &staff,
        ClientMessage::StaffSetRoundStatus {
            round_id: rounds[1].id.clone(),
            status: RoundStatus::AnswerTime,
        },
    )
    .await;
    let president = match send(
        &state,
        &alice,
        ClientMessage::GetRoundQuestions {
            round_id: rounds[1].id.clone(),
        },
    )
    .await
    {
        ServerMessage::RoundQuestions { mut questions, .. } => questions.remove(0),
        other => panic!("Expected RoundQuestions, got {:?}", other),
    };
    for (actor, text) in [(&alice, "Lincoln"), (&bob, "washington")] {
        send(
            &state,
            actor,
            ClientMessage::SubmitResponse {
                question_id: president.id.clone(),
                text: text.to_string(),
            },
        )
        .await;
    }
    for status in [RoundStatus::CheckAnswers, RoundStatus::Closed] {
        send(
            &state,
            &staff,
            ClientMessage::StaffSetRoundStatus {
                round_id: rounds[1].id.clone(),
                status,
            },
        )
        .await;
    }

    // Alice: (2 + 2) doubled = 8. Bob: 2 + 2 (peer-checked) + 2 = 6.
    match send(
        &state,
        &bob,
        ClientMessage::GetScores {
            game_id: game.id.clone(),
        },
    )
    .await
    {
        ServerMessage::Scoreboard { players, .. } => {
            assert_eq!(players[0].player_id, tokens[0].id);
            assert_eq!(players[0].total, 8);
            assert_eq!(players[1].total, 6);
        }
        other => panic!("Expected Scoreboard, got {:?}", other),
    }

    // 8. Final round: wager capped by current score
    send(
        &state,
        &staff,
        ClientMessage::StaffSetFinalRoundStatus {
            final_round_id: final_round.id.clone(),
            status: FinalRoundStatus::Wager,
        },
    )
    .await;

    assert_error(
        send(
            &state,
            &alice,
            ClientMessage::SubmitWager {
                game_id: game.id.clone(),
                wager: 9,
            },
        )
        .await,
        "VALIDATION_ERROR",
    );
    for (actor, wager) in [(&alice, 8), (&bob, 6)] {
        let reply = send(
            &state,
            actor,
            ClientMessage::SubmitWager {
                game_id: game.id.clone(),
                wager,
            },
        )
        .await;
        assert!(matches!(reply, ServerMessage::WagerAccepted { .. }));
    }

    send(
        &state,
        &staff,
        ClientMessage::StaffSetFinalRoundStatus {
            final_round_id: final_round.id.clone(),
            status: FinalRoundStatus::AnswerTime,
        },
    )
    .await;
    for (actor, text) in [(&alice, "au"), (&bob, "Ag")] {
        let reply = send(
            &state,
            actor,
            ClientMessage::SubmitFinalAnswer {
                game_id: game.id.clone(),
                text: text.to_string(),
            },
        )
        .await;
        assert!(matches!(reply, ServerMessage::FinalAnswerSaved { .. }));
    }

    send(
        &state,
        &staff,
        ClientMessage::StaffSetFinalRoundStatus {
            final_round_id: final_round.id.clone(),
            status: FinalRoundStatus::CheckAnswers,
        },
    )
    .await;
    let final_responses = match send(
        &state,
        &staff,
        ClientMessage::StaffListFinalResponses {
            game_id: game.id.clone(),
        },
    )
    .await
    {
        ServerMessage::FinalResponses { responses, .. } => responses,
        other => panic!("Expected FinalResponses, got {:?}", other),
    };
    assert_eq!(final_responses.len(), 2);
    for response in final_responses {
        let correct = response.response.eq_ignore_ascii_case("au");
        send(
            &state,
            &staff,
            ClientMessage::StaffMarkFinalResponse {
                final_response_id: response.id,
                correct,
            },
        )
        .await;
    }

    // Final scores only count once the final round is closed
    send(
        &state,
        &staff,
        ClientMessage::StaffSetFinalRoundStatus {
            final_round_id: final_round.id.clone(),
            status: FinalRoundStatus::Closed,
        },
    )
    .await;

    match send(
        &state,
        &staff,
        ClientMessage::StaffCompleteGame {
            game_id: game.id.clone(),
        },
    )
    .await
    {
        ServerMessage::GameCompleted { game } => assert!(game.completed),
        other => panic!("Expected GameCompleted, got {:?}", other),
    }

    let board = state.game_scores(&game.id).await.unwrap();
    let alice_card = board.iter().find(|c| c.player_id == tokens[0].id).unwrap();
    let bob_card = board.iter().find(|c| c.player_id == tokens[1].id).unwrap();
    assert_eq!(alice_card.score_for(&RoundKey::Final), Some(8));
    assert_eq!(alice_card.total, 16);
    assert_eq!(bob_card.score_for(&RoundKey::Final), Some(-6));
    assert_eq!(bob_card.total, 0);

    // 9. Everyone heard about the status changes
    let mut saw_round_status = false;
    let mut saw_completion = false;
    while let Ok(msg) = rx.try_recv() {
        match msg {
            ServerMessage::RoundStatus { .. } => saw_round_status = true,
            ServerMessage::GameCompleted { .. } => saw_completion = true,
            _ => {}
        }
    }
    assert!(saw_round_status);
    assert!(saw_completion);
}

#[tokio::test]
async fn test_game_cannot_complete_with_open_rounds() {
    let state = Arc::new(AppState::new());
    let staff = Actor::staff();
    let game = match send(
        &state,
        &staff,
        ClientMessage::StaffCreateGame {
            title: "Half Done".to_string(),
        },
    )
    .await
    {
        ServerMessage::GameCreated { game } => game,
        other => panic!("Expected GameCreated, got {:?}", other),
    };
    send(
        &state,
        &staff,
        ClientMessage::StaffCreateRound {
            game_id: game.id.clone(),
            category: "Music".to_string(),
        },
    )
    .await;

    assert_error(
        send(
            &state,
            &staff,
            ClientMessage::StaffCompleteGame {
                game_id: game.id.clone(),
            },
        )
        .await,
        "VALIDATION_ERROR",
    );
}

#[tokio::test]
async fn test_failed_import_leaves_no_game() {
    let state = Arc::new(AppState::new());
    let reply = send(
        &state,
        &Actor::staff(),
        ClientMessage::StaffImportGame {
            title: "Broken".to_string(),
            csv: "Music, Q1, A1\nMusic, Q2, A2\nMusic, Q3\n".to_string(),
        },
    )
    .await;
    assert_error(reply, "IMPORT_FAILED");

    match send(&state, &Actor::anonymous(), ClientMessage::ListGames).await {
        ServerMessage::Games { games } => assert!(games.is_empty()),
        other => panic!("Expected Games, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_resubmissions_keep_one_response() {
    let state = Arc::new(AppState::new());
    let staff = Actor::staff();
    let summary = state
        .import_game_csv(&staff, "Race".to_string(), QUIZ_CSV.as_bytes())
        .await
        .unwrap();
    let player = state.create_player().await;
    let actor = Actor::player(&player.id);
    state.join_game(&actor, &summary.game.id).await.unwrap();
    let detail = state.game_detail(&summary.game.id).await.unwrap();
    let round = &detail.rounds[0];
    state
        .set_round_status(&staff, &round.id, RoundStatus::AnswerTime)
        .await
        .unwrap();
    let question = state.round_questions(&round.id).await.unwrap().remove(0);

    let mut handles = Vec::new();
    for i in 0..20 {
        let state = state.clone();
        let actor = actor.clone();
        let question_id = question.id.clone();
        handles.push(tokio::spawn(async move {
            state
                .submit_response(&actor, &question_id, format!("guess {}", i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mine = state.my_responses(&actor, &round.id).await.unwrap();
    assert_eq!(mine.len(), 1);
}
