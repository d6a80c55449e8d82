//! # JSON-Lines Commands
//!
//! One command per input line, tagged by `op`:
//!
//! ```json
//! {"op":"create_bounty","caller":"0xc0..","title":"Audit","description":"..",
//!  "requirements":"..","deadline":1750086400,"difficulty":6,"category":5,
//!  "reward":{"values":["656e633a726577617264"]}}
//! ```
//!
//! Encrypted inputs carry hex ciphertexts and an optional hex proof. A
//! missing proof is produced on the caller's behalf with the hash-binding
//! scheme, the way a client SDK would before submitting.

use bounty_lifecycle::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Encrypted input as written in a command.
#[derive(Debug, Clone, Deserialize)]
pub struct WireInput {
    /// Hex ciphertexts.
    pub values: Vec<EncryptedValue>,
    /// Hex proof; sealed for the caller when absent.
    #[serde(default)]
    pub proof: Option<Proof>,
}

impl WireInput {
    /// Input with a proof bound to `caller`.
    #[must_use]
    pub fn into_input(self, caller: &Address) -> EncryptedInput {
        match self.proof {
            Some(proof) => EncryptedInput::new(self.values, proof),
            None => HashBindingCompute::seal(caller, self.values),
        }
    }
}

/// A board command.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Command {
    CreateBounty {
        caller: Address,
        title: String,
        description: String,
        requirements: String,
        deadline: Timestamp,
        difficulty: u8,
        category: u8,
        reward: WireInput,
    },
    SubmitApplication {
        caller: Address,
        bounty_id: BountyId,
        proposal: String,
        encrypted: WireInput,
    },
    AcceptApplication {
        caller: Address,
        application_id: ApplicationId,
    },
    SubmitWork {
        caller: Address,
        application_id: ApplicationId,
        submission_hash: String,
        encrypted: WireInput,
    },
    VerifySubmission {
        caller: Address,
        submission_id: SubmissionId,
        passed: bool,
        #[serde(default)]
        feedback: Option<String>,
    },
    UpdateReputation {
        caller: Address,
        identity: Address,
        value: WireInput,
    },
    PauseBounty {
        caller: Address,
        bounty_id: BountyId,
    },
    CreateProfile {
        caller: Address,
        profile_hash: String,
        encrypted: WireInput,
    },
    UpdateProfile {
        caller: Address,
        profile_hash: String,
        encrypted: WireInput,
    },
    VerifyUser {
        caller: Address,
        identity: Address,
        #[serde(default = "grant")]
        verified: bool,
    },
    SetVerifier {
        caller: Address,
        verifier: Address,
    },
    GetBounty {
        id: BountyId,
    },
    GetApplication {
        id: ApplicationId,
    },
    GetSubmission {
        id: SubmissionId,
    },
    GetProfile {
        identity: Address,
    },
    GetReputation {
        identity: Address,
    },
    ListBounties {
        #[serde(default)]
        filter: BountyFilter,
    },
    ApplicationsForBounty {
        bounty_id: BountyId,
    },
    ApplicationsByApplicant {
        applicant: Address,
    },
    SubmissionsForApplication {
        application_id: ApplicationId,
    },
    Roles,
    Stats,
}

impl Command {
    /// Label echoed in the response.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateBounty { .. } => "create_bounty",
            Self::SubmitApplication { .. } => "submit_application",
            Self::AcceptApplication { .. } => "accept_application",
            Self::SubmitWork { .. } => "submit_work",
            Self::VerifySubmission { .. } => "verify_submission",
            Self::UpdateReputation { .. } => "update_reputation",
            Self::PauseBounty { .. } => "pause_bounty",
            Self::CreateProfile { .. } => "create_profile",
            Self::UpdateProfile { .. } => "update_profile",
            Self::VerifyUser { .. } => "verify_user",
            Self::SetVerifier { .. } => "set_verifier",
            Self::GetBounty { .. } => "get_bounty",
            Self::GetApplication { .. } => "get_application",
            Self::GetSubmission { .. } => "get_submission",
            Self::GetProfile { .. } => "get_profile",
            Self::GetReputation { .. } => "get_reputation",
            Self::ListBounties { .. } => "list_bounties",
            Self::ApplicationsForBounty { .. } => "applications_for_bounty",
            Self::ApplicationsByApplicant { .. } => "applications_by_applicant",
            Self::SubmissionsForApplication { .. } => "submissions_for_application",
            Self::Roles => "roles",
            Self::Stats => "stats",
        }
    }

    /// Run against `board`, returning the JSON result.
    ///
    /// # Errors
    ///
    /// `CommandError::Rejected` with whatever the board operation returns,
    /// or `CommandError::Encode` if the result cannot be rendered.
    pub fn apply(self, board: &BountyBoardService) -> Result<Value, CommandError> {
        let value = match self {
            Self::CreateBounty {
                caller,
                title,
                description,
                requirements,
                deadline,
                difficulty,
                category,
                reward,
            } => {
                let id = board.create_bounty(
                    caller,
                    NewBounty {
                        title,
                        description,
                        requirements,
                        deadline,
                        difficulty,
                        category,
                        reward: reward.into_input(&caller),
                    },
                )?;
                json!({ "bounty_id": id })
            }
            Self::SubmitApplication {
                caller,
                bounty_id,
                proposal,
                encrypted,
            } => {
                let id = board.submit_application(
                    caller,
                    NewApplication {
                        bounty_id,
                        proposal,
                        encrypted: encrypted.into_input(&caller),
                    },
                )?;
                json!({ "application_id": id })
            }
            Self::AcceptApplication {
                caller,
                application_id,
            } => {
                board.accept_application(caller, application_id)?;
                Value::Null
            }
            Self::SubmitWork {
                caller,
                application_id,
                submission_hash,
                encrypted,
            } => {
                let id = board.submit_work(
                    caller,
                    NewSubmission {
                        application_id,
                        submission_hash,
                        encrypted: encrypted.into_input(&caller),
                    },
                )?;
                json!({ "submission_id": id })
            }
            Self::VerifySubmission {
                caller,
                submission_id,
                passed,
                feedback,
            } => to_json(&board.verify_submission(caller, submission_id, passed, feedback)?)?,
            Self::UpdateReputation {
                caller,
                identity,
                value,
            } => {
                board.update_reputation(caller, identity, value.into_input(&caller))?;
                Value::Null
            }
            Self::PauseBounty { caller, bounty_id } => {
                board.pause_bounty(caller, bounty_id)?;
                Value::Null
            }
            Self::CreateProfile {
                caller,
                profile_hash,
                encrypted,
            } => {
                let id = board.create_profile(
                    caller,
                    ProfileInput {
                        profile_hash,
                        encrypted: encrypted.into_input(&caller),
                    },
                )?;
                json!({ "profile_id": id })
            }
            Self::UpdateProfile {
                caller,
                profile_hash,
                encrypted,
            } => {
                board.update_profile(
                    caller,
                    ProfileInput {
                        profile_hash,
                        encrypted: encrypted.into_input(&caller),
                    },
                )?;
                Value::Null
            }
            Self::VerifyUser {
                caller,
                identity,
                verified,
            } => {
                json!({ "changed": board.verify_user(caller, identity, verified)? })
            }
            Self::SetVerifier { caller, verifier } => {
                board.set_verifier(caller, verifier)?;
                Value::Null
            }
            Self::GetBounty { id } => to_json(&board.get_bounty_info(id)?)?,
            Self::GetApplication { id } => to_json(&board.get_application_info(id)?)?,
            Self::GetSubmission { id } => to_json(&board.get_submission_info(id)?)?,
            Self::GetProfile { identity } => to_json(&board.get_user_profile(identity)?)?,
            Self::GetReputation { identity } => to_json(&board.get_user_reputation(identity))?,
            Self::ListBounties { filter } => to_json(&board.list_bounties(filter))?,
            Self::ApplicationsForBounty { bounty_id } => {
                to_json(&board.applications_for_bounty(bounty_id)?)?
            }
            Self::ApplicationsByApplicant { applicant } => {
                to_json(&board.applications_by_applicant(applicant))?
            }
            Self::SubmissionsForApplication { application_id } => {
                to_json(&board.submissions_for_application(application_id)?)?
            }
            Self::Roles => to_json(&board.roles())?,
            Self::Stats => to_json(&board.stats())?,
        };
        Ok(value)
    }
}

fn grant() -> bool {
    true
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(value)?)
}

/// Why a parsed command produced no result.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The board refused the operation.
    #[error(transparent)]
    Rejected(#[from] BountyError),

    /// The result could not be rendered as JSON.
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CommandError {
    /// Error class reported in the response.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected(err) => err.kind().as_str(),
            Self::Encode(_) => "encode",
        }
    }
}

/// Error portion of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Error class, e.g. `unauthorized`, or `parse` for unreadable lines.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// One output line.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// 1-based input line number.
    pub line: usize,
    /// Command label, absent when the line did not parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<&'static str>,
    /// Whether the command succeeded.
    pub ok: bool,
    /// Command result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Successful command.
    #[must_use]
    pub fn success(line: usize, op: &'static str, result: Value) -> Self {
        Self {
            line,
            op: Some(op),
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Rejected command.
    #[must_use]
    pub fn rejected(line: usize, op: &'static str, err: &CommandError) -> Self {
        Self {
            line,
            op: Some(op),
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            }),
        }
    }

    /// Unparsable line.
    #[must_use]
    pub fn unparsable(line: usize, message: String) -> Self {
        Self {
            line,
            op: None,
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind: "parse",
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_bounty() {
        let line = r#"{"op":"create_bounty","caller":"0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0",
            "title":"Audit","description":"d","requirements":"r","deadline":10,
            "difficulty":3,"category":0,"reward":{"values":["0a0b"]}}"#;
        let command: Command = serde_json::from_str(line).unwrap();
        assert_eq!(command.name(), "create_bounty");
        match command {
            Command::CreateBounty { reward, .. } => {
                assert_eq!(reward.values[0].as_bytes(), &[0x0a, 0x0b]);
                assert!(reward.proof.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_missing_proof_is_sealed_for_caller() {
        let caller = Address::new([7; 20]);
        let wire = WireInput {
            values: vec![EncryptedValue::new(vec![1, 2])],
            proof: None,
        };
        let input = wire.into_input(&caller);
        assert!(HashBindingCompute.verify_input(&caller, &input).is_ok());
        assert!(HashBindingCompute
            .verify_input(&Address::new([8; 20]), &input)
            .is_err());
    }

    #[test]
    fn test_unit_commands_and_filters() {
        let stats: Command = serde_json::from_str(r#"{"op":"stats"}"#).unwrap();
        assert_eq!(stats.name(), "stats");

        let list: Command =
            serde_json::from_str(r#"{"op":"list_bounties","filter":{"filter":"active"}}"#).unwrap();
        assert!(matches!(
            list,
            Command::ListBounties {
                filter: BountyFilter::Active
            }
        ));

        let all: Command = serde_json::from_str(r#"{"op":"list_bounties"}"#).unwrap();
        assert!(matches!(
            all,
            Command::ListBounties {
                filter: BountyFilter::All
            }
        ));
    }

    #[test]
    fn test_rejected_response_shape() {
        let err = CommandError::from(BountyError::BountyNotFound(4));
        let response = Response::rejected(3, "get_bounty", &err);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["kind"], "not_found");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_encode_failure_is_reported() {
        // JSON object keys must be strings.
        let unencodable: std::collections::BTreeMap<(u8, u8), u8> = [((1, 2), 3)].into();
        let err = to_json(&unencodable).unwrap_err();
        assert!(matches!(err, CommandError::Encode(_)));

        let response = Response::rejected(7, "stats", &err);
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().kind, "encode");
    }

    #[test]
    fn test_verify_user_defaults_to_grant() {
        let grant: Command = serde_json::from_str(
            r#"{"op":"verify_user","caller":"0x0101010101010101010101010101010101010101",
                "identity":"0x0202020202020202020202020202020202020202"}"#,
        )
        .unwrap();
        assert!(matches!(grant, Command::VerifyUser { verified: true, .. }));

        let revoke: Command = serde_json::from_str(
            r#"{"op":"verify_user","caller":"0x0101010101010101010101010101010101010101",
                "identity":"0x0202020202020202020202020202020202020202","verified":false}"#,
        )
        .unwrap();
        assert!(matches!(revoke, Command::VerifyUser { verified: false, .. }));
    }
}
