//! Newline-delimited JSON requests mirroring the ledger's call surface.
//!
//! One request per line, tagged by `op`. Byte fields (ciphertexts, proofs,
//! vote weights, raw content) are hex strings. Every request produces exactly
//! one [`Response`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use whisper_governance::{ForumApi, ForumError};
use whisper_store::ContentStore;
use whisper_types::{ActorId, ContentHash, PostId};

use crate::error::RequestError;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    CreatePost {
        caller: String,
        title: String,
        content_hash: String,
        category: u64,
        #[serde(with = "hex")]
        encrypted_content: Vec<u8>,
        #[serde(with = "hex")]
        input_proof: Vec<u8>,
    },
    AddComment {
        caller: String,
        post_id: u64,
        content_hash: String,
        #[serde(with = "hex")]
        encrypted_content: Vec<u8>,
        #[serde(with = "hex")]
        input_proof: Vec<u8>,
    },
    VoteOnPost {
        caller: String,
        post_id: u64,
        is_upvote: bool,
        #[serde(with = "hex")]
        vote_weight: Vec<u8>,
        #[serde(with = "hex")]
        input_proof: Vec<u8>,
    },
    CreateProposal {
        caller: String,
        title: String,
        description: String,
        proposal_hash: String,
        duration: u64,
        threshold: u64,
        #[serde(with = "hex")]
        encrypted_details: Vec<u8>,
        #[serde(with = "hex")]
        input_proof: Vec<u8>,
    },
    VoteOnProposal {
        caller: String,
        proposal_id: u64,
        is_yes: bool,
        #[serde(with = "hex")]
        vote_weight: Vec<u8>,
        #[serde(with = "hex")]
        input_proof: Vec<u8>,
    },
    GetPostInfo {
        post_id: u64,
    },
    GetProposalInfo {
        proposal_id: u64,
    },
    GetUserReputation {
        user: String,
    },
    ListComments {
        post_id: u64,
    },
    Moderate {
        caller: String,
        post_id: u64,
        flag: bool,
    },
    GrantModerator {
        caller: String,
        target: String,
    },
    PutContent {
        #[serde(with = "hex")]
        data: Vec<u8>,
    },
    GetContent {
        content_hash: String,
    },
}

impl Request {
    pub fn parse(line: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(line)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Response {
    Ok {
        #[serde(skip_serializing_if = "Value::is_null")]
        result: Value,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

impl Response {
    fn from_result<T: Serialize>(result: Result<T, ForumError>) -> Self {
        match result {
            Ok(value) => match serde_json::to_value(value) {
                Ok(result) => Response::Ok { result },
                Err(e) => Response::Error {
                    code: "codec_error",
                    message: e.to_string(),
                },
            },
            Err(e) => Response::Error {
                code: e.code(),
                message: e.to_string(),
            },
        }
    }

    fn malformed(e: &RequestError) -> Self {
        Response::Error {
            code: "malformed_request",
            message: e.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}

/// Executes requests against one ledger and its content store.
pub struct Dispatcher {
    api: ForumApi,
    content: Arc<dyn ContentStore>,
}

impl Dispatcher {
    pub fn new(api: ForumApi, content: Arc<dyn ContentStore>) -> Self {
        Self { api, content }
    }

    /// Parse and execute one line. Malformed lines get an error response.
    pub fn handle_line(&self, line: &str) -> Response {
        match Request::parse(line) {
            Ok(request) => self.execute(request),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed request");
                Response::malformed(&e)
            }
        }
    }

    pub fn execute(&self, request: Request) -> Response {
        let api = &self.api;
        match request {
            Request::CreatePost {
                caller,
                title,
                content_hash,
                category,
                encrypted_content,
                input_proof,
            } => Response::from_result(api.create_post(
                &caller,
                &title,
                &content_hash,
                category,
                &encrypted_content,
                &input_proof,
            )),
            Request::AddComment {
                caller,
                post_id,
                content_hash,
                encrypted_content,
                input_proof,
            } => Response::from_result(api.add_comment(
                &caller,
                post_id,
                &content_hash,
                &encrypted_content,
                &input_proof,
            )),
            Request::VoteOnPost {
                caller,
                post_id,
                is_upvote,
                vote_weight,
                input_proof,
            } => Response::from_result(api.vote_on_post(
                &caller,
                post_id,
                is_upvote,
                &vote_weight,
                &input_proof,
            )),
            Request::CreateProposal {
                caller,
                title,
                description,
                proposal_hash,
                duration,
                threshold,
                encrypted_details,
                input_proof,
            } => Response::from_result(api.create_proposal(
                &caller,
                &title,
                &description,
                &proposal_hash,
                duration,
                threshold,
                &encrypted_details,
                &input_proof,
            )),
            Request::VoteOnProposal {
                caller,
                proposal_id,
                is_yes,
                vote_weight,
                input_proof,
            } => Response::from_result(api.vote_on_proposal(
                &caller,
                proposal_id,
                is_yes,
                &vote_weight,
                &input_proof,
            )),
            Request::GetPostInfo { post_id } => Response::from_result(api.get_post_info(post_id)),
            Request::GetProposalInfo { proposal_id } => {
                Response::from_result(api.get_proposal_info(proposal_id))
            }
            Request::GetUserReputation { user } => {
                Response::from_result(api.get_user_reputation(&user))
            }
            Request::ListComments { post_id } => {
                Response::from_result(api.forum().query().comments(PostId::new(post_id)))
            }
            Request::Moderate {
                caller,
                post_id,
                flag,
            } => Response::from_result(ActorId::parse(&caller).map_err(ForumError::from).and_then(
                |moderator| api.forum().posts().moderate(&moderator, PostId::new(post_id), flag),
            )),
            Request::GrantModerator { caller, target } => Response::from_result(
                ActorId::parse(&caller)
                    .and_then(|admin| Ok((admin, ActorId::parse(&target)?)))
                    .map_err(ForumError::from)
                    .and_then(|(admin, target)| api.forum().identity().grant_moderator(&admin, &target))
                    .map(|rep| rep.is_moderator),
            ),
            Request::PutContent { data } => Response::from_result(
                self.content
                    .put_content(&data)
                    .map(|hash| hash.as_str().to_string())
                    .map_err(ForumError::from),
            ),
            Request::GetContent { content_hash } => Response::from_result(
                ContentHash::new(content_hash)
                    .map_err(ForumError::from)
                    .and_then(|hash| self.content.get_content(&hash).map_err(ForumError::from))
                    .map(|data| data.map(hex::encode)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisper_governance::{Forum, LedgerParams};
    use whisper_nullables::{NullClock, NullContentStore, NullStore, NullVerifier};
    use whisper_proof::HashChainTally;

    fn dispatcher(params: LedgerParams) -> Dispatcher {
        let forum = Forum::new(
            Arc::new(NullStore::new()),
            Arc::new(NullVerifier::accept_all()),
            Arc::new(HashChainTally),
            Arc::new(NullClock::new(1_000)),
            params,
        );
        Dispatcher::new(
            ForumApi::new(Arc::new(forum)),
            Arc::new(NullContentStore::new()),
        )
    }

    fn ok_result(response: Response) -> Value {
        match response {
            Response::Ok { result } => result,
            Response::Error { code, message } => panic!("unexpected {code}: {message}"),
        }
    }

    const CREATE_POST: &str = r#"{"op":"createPost","caller":"0xalice","title":"Hello","contentHash":"bafy1","category":2,"encryptedContent":"c0ffee","inputProof":"01"}"#;

    #[test]
    fn parses_hex_byte_fields() {
        let request = Request::parse(CREATE_POST).unwrap();
        match request {
            Request::CreatePost {
                encrypted_content,
                category,
                ..
            } => {
                assert_eq!(encrypted_content, vec![0xc0, 0xff, 0xee]);
                assert_eq!(category, 2);
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn replays_a_post_and_reads_it_back() {
        let d = dispatcher(LedgerParams::default());
        assert_eq!(ok_result(d.handle_line(CREATE_POST)), Value::from(1));

        let info = ok_result(d.handle_line(r#"{"op":"getPostInfo","postId":1}"#));
        assert_eq!(info["title"], "Hello");
        assert_eq!(info["category"], 2);
        assert_eq!(info["upvotes"], 0);
    }

    #[test]
    fn ledger_errors_carry_their_code() {
        let d = dispatcher(LedgerParams::default());
        let response = d.handle_line(r#"{"op":"getProposalInfo","proposalId":3}"#);
        assert!(matches!(response, Response::Error { code: "not_found", .. }));

        let response = d.handle_line(r#"{"op":"grantModerator","caller":"0xnobody","target":"0xbob"}"#);
        assert!(matches!(response, Response::Error { code: "permission_denied", .. }));
    }

    #[test]
    fn malformed_lines_do_not_abort() {
        let d = dispatcher(LedgerParams::default());
        let response = d.handle_line(r#"{"op":"createPost","caller":"0xalice"}"#);
        assert!(matches!(response, Response::Error { code: "malformed_request", .. }));
        let response = d.handle_line(r#"{"op":"voteOnPost","caller":"a","postId":1,"isUpvote":true,"voteWeight":"zz","inputProof":"01"}"#);
        assert!(!response.is_ok());
    }

    #[test]
    fn content_round_trips_through_the_store() {
        let d = dispatcher(LedgerParams::default());
        let hash = ok_result(d.handle_line(r#"{"op":"putContent","data":"68656c6c6f"}"#));
        let hash = hash.as_str().unwrap().to_string();
        let fetched = ok_result(d.handle_line(&format!(
            r#"{{"op":"getContent","contentHash":"{hash}"}}"#
        )));
        assert_eq!(fetched, "68656c6c6f");
    }

    #[test]
    fn unit_results_serialize_without_payload() {
        let d = dispatcher(LedgerParams::default());
        d.handle_line(CREATE_POST);
        let response = d.handle_line(
            r#"{"op":"voteOnPost","caller":"0xbob","postId":1,"isUpvote":true,"voteWeight":"05","inputProof":"01"}"#,
        );
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"status":"ok"}"#);
    }
}
