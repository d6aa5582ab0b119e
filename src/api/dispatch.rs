//! Runs a reducer [`Request`] against the API and packs the result as a
//! [`Response`].
//!
//! Pages that show data from several endpoints fetch them concurrently with
//! `futures::join!`. Secondary data (settings, the user list, visibility) is
//! best-effort: its failure is logged and replaced by a neutral default so the
//! page still renders.

use std::fmt::Display;

use log::{info, warn};

use super::client::ApiClient;
use super::error::ApiError;
use crate::core::action::{Request, Response};
use crate::core::routing::babies_visible;
use crate::core::session::Session;

fn or_default<T: Default, E: Display>(result: Result<T, E>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!("Could not load {what}, continuing without it: {e}");
        T::default()
    })
}

pub async fn execute(
    client: &ApiClient,
    session: &Session,
    request: Request,
    max_upload_bytes: u64,
) -> Result<Response, ApiError> {
    match request {
        Request::Login { email, password } => {
            client.login(&email, &password).await.map(Response::LoggedIn)
        }
        Request::Register { email, password } => {
            client.register(&email, &password).await.map(Response::LoggedIn)
        }
        Request::LoadProfile => {
            let (me, babies) = futures::join!(client.me(session), client.babies(session));
            Ok(Response::Profile {
                me: me?,
                babies_visible: babies_visible(&or_default(babies, "babies")),
            })
        }
        Request::ChangePassword { current, new } => {
            client.change_password(session, &current, &new).await?;
            Ok(Response::PasswordChanged)
        }
        Request::SavePartner(partner) => {
            client.update_partner(session, &partner).await?;
            Ok(Response::PartnerSaved(partner))
        }
        Request::LoadQuestionnaire => {
            let (data, settings, babies) = futures::join!(
                client.questionnaire(session),
                client.settings(session),
                client.babies(session)
            );
            Ok(Response::Questionnaire {
                data: data?,
                locked: or_default(settings, "settings").questionnaires_locked(),
                babies_visible: babies_visible(&or_default(babies, "babies")),
            })
        }
        Request::SaveQuestionnaire(answers) => {
            client.save_questionnaire(session, &answers).await?;
            Ok(Response::QuestionnaireSaved)
        }
        Request::UploadImage(path) => {
            let uploaded = client.upload_image(session, &path, max_upload_bytes).await?;
            info!("Uploaded {} as {}", path.display(), uploaded.filename);
            Ok(Response::ImageUploaded(uploaded.filename))
        }
        Request::LoadBabies => {
            let (babies, selected) =
                futures::join!(client.babies(session), client.selected_baby(session));
            Ok(Response::Babies {
                babies: babies?,
                selected: or_default(selected, "selected baby"),
            })
        }
        Request::LoadMyBabies => {
            let (mine, babies) =
                futures::join!(client.my_babies(session), client.babies(session));
            Ok(Response::MyBabies {
                babies: mine?,
                babies_visible: babies_visible(&or_default(babies, "babies")),
            })
        }
        Request::SelectBaby(baby_id) => {
            client.select_baby(session, baby_id).await?;
            Ok(Response::BabySelected(baby_id))
        }
        Request::LoadChat(baby_id) => {
            let history = client.chat_history(session, baby_id).await?;
            Ok(Response::ChatHistory { baby_id, history })
        }
        Request::SendChat {
            baby_id,
            message,
            stage,
        } => {
            let reply = client
                .send_message(session, baby_id, &message, stage.as_ref())
                .await?;
            Ok(Response::ChatReply {
                baby_id,
                sent: message,
                reply,
            })
        }
        Request::LoadAdmin => {
            let (questionnaires, babies, users, settings) = futures::join!(
                client.all_questionnaires(session),
                client.babies(session),
                client.users(session),
                client.settings(session)
            );
            Ok(Response::Admin {
                questionnaires: questionnaires?,
                babies: babies?,
                users: or_default(users, "users"),
                locked: or_default(settings, "settings").questionnaires_locked(),
            })
        }
        Request::SetBabiesVisible(visible) => {
            client.set_babies_visible(session, visible).await?;
            Ok(Response::BabiesVisibilitySet(visible))
        }
        Request::SetQuestionnairesLocked(locked) => {
            client.set_questionnaires_locked(session, locked).await?;
            Ok(Response::QuestionnairesLockSet(locked))
        }
        Request::AssignBaby { baby_id, user_id } => {
            client.assign_baby(session, baby_id, user_id).await?;
            Ok(Response::BabyAssigned { baby_id, user_id })
        }
    }
}
