//! Property-based tests for the in-memory repository
//!
//! Random interleavings of customer and operator sends across a few
//! conversations, with the occasional clear.

use proptest::prelude::*;

use supportdesk::backend::store::{ChatRepository, MemoryRepository, NewMessage};
use supportdesk::shared::messaging::Sender;

#[derive(Debug, Clone)]
enum Op {
    Send { user: usize, operator: bool },
    Clear { user: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0usize..3, any::<bool>()).prop_map(|(user, operator)| Op::Send { user, operator }),
        1 => (0usize..3).prop_map(|user| Op::Clear { user }),
    ]
}

proptest! {
    #[test]
    fn test_counts_and_ids_follow_history(ops in prop::collection::vec(op(), 1..60)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let repo = MemoryRepository::new();
            let mut users = Vec::new();
            for email in ["a@example.com", "b@example.com", "c@example.com"] {
                users.push(repo.register(email).await.unwrap().id);
            }

            let mut expected = [0u64; 3];
            let mut last_id = 0;
            for op in &ops {
                match *op {
                    Op::Send { user, operator } => {
                        let sender = if operator { Sender::Operator } else { Sender::Customer };
                        let stored = repo
                            .append(NewMessage {
                                user_id: users[user],
                                text: "x".to_string(),
                                image: None,
                                sender,
                            })
                            .await
                            .unwrap();
                        prop_assert!(stored.id > last_id);
                        last_id = stored.id;
                        if !operator {
                            expected[user] += 1;
                        }
                    }
                    Op::Clear { user } => {
                        repo.clear(users[user]).await.unwrap();
                        expected[user] = 0;
                    }
                }
            }

            let list = repo.conversations().await.unwrap();
            for (index, user_id) in users.iter().enumerate() {
                let conversation = list.iter().find(|c| c.id == *user_id).unwrap();
                prop_assert_eq!(conversation.message_count, expected[index]);
            }
            Ok(())
        })?;
    }
}
