use tracing::{info, warn};

use crate::auth::{dto::SignupRequest, services as auth_services, AuthUser, User};
use crate::folders::services as folder_services;
use crate::notes::{
    repo_types::{NewNote, NotePatch},
    services as note_services,
};
use crate::store::Store;

const DEMO_PASSWORD: &str = "password123";
const DEMO_PARENT: &str = "ayush";
const DEMO_CHILDREN: [&str; 2] = ["arun", "kavita"];

// title, content, tags, is_todo, is_completed, folder index
const DEMO_NOTES: &[(&str, &str, &str, bool, bool, Option<usize>)] = &[
    ("Gym Routine", "Create workout plan for the next 4 weeks", "fitness,health", true, false, Some(1)),
    ("Travel Checklist", "Pack essentials for Goa trip", "travel,checklist", true, true, None),
    ("Recipe Ideas", "Try out pasta with creamy mushroom sauce", "cooking,food", false, false, Some(1)),
    ("Homework", "Math p.12", "math", true, false, Some(0)),
];

fn caller(user: &User) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role,
    }
}

/// Populate a demo family. Does nothing if any demo username is already taken.
pub async fn seed_demo_data(store: &dyn Store) -> anyhow::Result<()> {
    if store.find_user_by_username(DEMO_PARENT).await?.is_some() {
        info!("demo data already present");
        return Ok(());
    }
    for name in DEMO_CHILDREN {
        if store.find_user_by_username(name).await?.is_some() {
            warn!(username = name, "demo username taken, skipping seed");
            return Ok(());
        }
    }

    let parent = auth_services::signup(
        store,
        None,
        SignupRequest {
            username: DEMO_PARENT.into(),
            password: DEMO_PASSWORD.into(),
            role: "parent".into(),
            email: Some("ayush@email.com".into()),
        },
    )
    .await?;

    for name in DEMO_CHILDREN {
        let child = auth_services::signup(
            store,
            Some(caller(&parent)),
            SignupRequest {
                username: name.into(),
                password: DEMO_PASSWORD.into(),
                role: "child".into(),
                email: None,
            },
        )
        .await?;
        let child = caller(&child);

        let mut folders = Vec::new();
        for folder in ["School", "Personal"] {
            folders.push(folder_services::create(store, &child, folder).await?);
        }

        for &(title, content, tags, is_todo, is_completed, folder) in DEMO_NOTES {
            let note = note_services::create(
                store,
                &child,
                NewNote {
                    title: title.into(),
                    content: content.into(),
                    tags: tags.into(),
                    is_todo,
                    folder_id: folder.map(|i| folders[i].id),
                },
            )
            .await?;
            if is_completed {
                note_services::update(
                    store,
                    &child,
                    note.id,
                    NotePatch {
                        is_completed: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
            }
        }
    }

    info!(parent = DEMO_PARENT, "demo data seeded");
    Ok(())
}
