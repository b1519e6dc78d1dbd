//! File system backing store
//!
//! One JSON document per collection under the data directory:
//!
//! ```text
//! <data_dir>/submissions.json
//! <data_dir>/votes.json
//! ...
//! ```
//!
//! Each document is `{ "schema_version": "1.0", "records": [...] }`.
//! Writes go to a hidden per-process temp file that is renamed over the
//! document. Every read-check-write holds an exclusive lock on
//! `<data_dir>/<collection>.lock`, so separate `painboard` processes
//! sharing a data directory serialize on it.

use board_core::comment::Comment;
use board_core::error::{BoardError, Result};
use board_core::identity::Profile;
use board_core::interest::InterestRegistration;
use board_core::poll::{Poll, PollOption, PollVote};
use board_core::store::{deactivate_all, duplicate_registration, BackingStore, Collection};
use board_core::submission::{Submission, SubmissionStatus};
use board_core::types::{PollId, SubmissionId, VoterId};
use board_core::vote::Vote;
use serde::de::DeserializeOwned;
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema version written into every collection document
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// On-disk shape of a collection
#[derive(Debug, Deserialize)]
struct CollectionFile<T> {
    schema_version: String,
    records: Vec<T>,
}

/// Borrowed form of [`CollectionFile`] used for writing
#[derive(Serialize)]
struct CollectionFileRef<'a, T> {
    schema_version: &'a str,
    records: &'a [T],
}

/// Advisory lock on one collection, released when the handle is closed
struct CollectionLock {
    _file: fs::File,
}

/// File system based backing store
pub struct FileSystemStore {
    data_dir: PathBuf,
}

impl FileSystemStore {
    /// Open (and create if needed) a store rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| {
                BoardError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create data directory: {}", e),
                ))
            })?;
            debug!("Created data directory: {:?}", data_dir);
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a collection document
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.json", collection.name()))
    }

    /// Path of a collection's lock file
    pub fn lock_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!("{}.lock", collection.name()))
    }

    fn temp_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(format!(
            ".{}.json.{}.tmp",
            collection.name(),
            std::process::id()
        ))
    }

    fn open_lock_file(&self, collection: Collection) -> Result<fs::File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path(collection))
            .map_err(|e| BoardError::from(e).with_context(format!("opening {} lock", collection)))
    }

    /// Block until this handle holds the collection exclusively
    fn lock(&self, collection: Collection) -> Result<CollectionLock> {
        let file = self.open_lock_file(collection)?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| BoardError::from(e).with_context(format!("locking {}", collection)))?;
        Ok(CollectionLock { _file: file })
    }

    /// Block until no writer holds the collection
    fn lock_shared(&self, collection: Collection) -> Result<CollectionLock> {
        let file = self.open_lock_file(collection)?;
        FileExt::lock_shared(&file)
            .map_err(|e| BoardError::from(e).with_context(format!("locking {}", collection)))?;
        Ok(CollectionLock { _file: file })
    }

    /// Read every record of a collection; a missing document is empty
    fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let path = self.collection_path(collection);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BoardError::from(e).with_context(format!("reading {}", collection)))
            }
        };

        let document: CollectionFile<T> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| BoardError::from(e).with_context(format!("parsing {:?}", path)))?;

        if document.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(BoardError::Backend(format!(
                "{} has unsupported schema version {}",
                collection, document.schema_version
            )));
        }
        Ok(document.records)
    }

    /// Replace a collection document (write to temp, then rename)
    fn write<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        let temp_path = self.temp_path(collection);
        let final_path = self.collection_path(collection);

        let document = CollectionFileRef {
            schema_version: CURRENT_SCHEMA_VERSION,
            records,
        };

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            BoardError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            BoardError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!("Wrote {} records to {:?}", records.len(), final_path);
        Ok(())
    }

    /// Read-modify-write one collection under its lock
    fn update<T, R>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut Vec<T>) -> Result<R>,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock(collection)?;
        let mut records = self.read(collection)?;
        let result = f(&mut records)?;
        self.write(collection, &records)?;
        Ok(result)
    }

    fn list<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        let _guard = self.lock_shared(collection)?;
        self.read(collection)
    }
}

impl BackingStore for FileSystemStore {
    fn insert_submission(&self, submission: &Submission) -> Result<()> {
        self.update(Collection::Submissions, |records: &mut Vec<Submission>| {
            if records.iter().any(|s| s.id == submission.id) {
                return Err(BoardError::Validation(format!(
                    "Submission with ID {} already exists",
                    submission.id
                )));
            }
            records.push(submission.clone());
            Ok(())
        })
    }

    fn get_submission(&self, id: &SubmissionId) -> Result<Option<Submission>> {
        Ok(self
            .list::<Submission>(Collection::Submissions)?
            .into_iter()
            .find(|s| &s.id == id))
    }

    fn list_submissions(&self) -> Result<Vec<Submission>> {
        self.list(Collection::Submissions)
    }

    fn set_submission_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission> {
        self.update(Collection::Submissions, |records: &mut Vec<Submission>| {
            let submission = records
                .iter_mut()
                .find(|s| &s.id == id)
                .ok_or_else(|| BoardError::not_found("Submission", id))?;
            submission.status = status;
            Ok(submission.clone())
        })
    }

    fn insert_vote(&self, vote: &Vote) -> Result<()> {
        self.update(Collection::Votes, |records: &mut Vec<Vote>| {
            if records
                .iter()
                .any(|v| v.submission_id == vote.submission_id && v.voter_id == vote.voter_id)
            {
                return Err(BoardError::DuplicateVote {
                    target: vote.submission_id.to_string(),
                    voter: vote.voter_id.to_string(),
                });
            }
            records.push(vote.clone());
            Ok(())
        })
    }

    fn list_votes(&self) -> Result<Vec<Vote>> {
        self.list(Collection::Votes)
    }

    fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.update(Collection::Comments, |records: &mut Vec<Comment>| {
            records.push(comment.clone());
            Ok(())
        })
    }

    fn list_comments(&self) -> Result<Vec<Comment>> {
        self.list(Collection::Comments)
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        self.update(Collection::Profiles, |records: &mut Vec<Profile>| {
            match records.iter_mut().find(|p| p.voter_id == profile.voter_id) {
                Some(existing) => *existing = profile.clone(),
                None => records.push(profile.clone()),
            }
            Ok(())
        })
    }

    fn get_profile(&self, voter_id: &VoterId) -> Result<Option<Profile>> {
        Ok(self
            .list::<Profile>(Collection::Profiles)?
            .into_iter()
            .find(|p| &p.voter_id == voter_id))
    }

    fn insert_poll(&self, poll: &Poll, options: &[PollOption]) -> Result<Vec<PollId>> {
        // Lock order follows Collection order: polls before poll_options.
        let _polls = self.lock(Collection::Polls)?;
        let _options = self.lock(Collection::PollOptions)?;

        let mut polls: Vec<Poll> = self.read(Collection::Polls)?;
        let mut poll_options: Vec<PollOption> = self.read(Collection::PollOptions)?;

        // Options land first: if the polls write fails they are unreferenced
        // and the previously active poll is untouched.
        poll_options.extend(options.iter().cloned());
        self.write(Collection::PollOptions, &poll_options)?;

        let deactivated = if poll.is_active {
            deactivate_all(&mut polls)
        } else {
            Vec::new()
        };
        polls.push(poll.clone());
        self.write(Collection::Polls, &polls)?;

        info!("Stored poll {} with {} options", poll.id, options.len());
        Ok(deactivated)
    }

    fn list_polls(&self) -> Result<Vec<Poll>> {
        self.list(Collection::Polls)
    }

    fn list_poll_options(&self, poll_id: &PollId) -> Result<Vec<PollOption>> {
        Ok(self
            .list::<PollOption>(Collection::PollOptions)?
            .into_iter()
            .filter(|o| &o.poll_id == poll_id)
            .collect())
    }

    fn insert_poll_vote(&self, vote: &PollVote) -> Result<()> {
        self.update(Collection::PollVotes, |records: &mut Vec<PollVote>| {
            if records
                .iter()
                .any(|v| v.poll_id == vote.poll_id && v.voter_id == vote.voter_id)
            {
                return Err(BoardError::DuplicateVote {
                    target: vote.poll_id.to_string(),
                    voter: vote.voter_id.to_string(),
                });
            }
            records.push(vote.clone());
            Ok(())
        })
    }

    fn list_poll_votes(&self, poll_id: &PollId) -> Result<Vec<PollVote>> {
        Ok(self
            .list::<PollVote>(Collection::PollVotes)?
            .into_iter()
            .filter(|v| &v.poll_id == poll_id)
            .collect())
    }

    fn insert_registration(&self, registration: &InterestRegistration) -> Result<()> {
        self.update(
            Collection::InterestRegistrations,
            |records: &mut Vec<InterestRegistration>| {
                if records.iter().any(|r| {
                    r.voter_id == registration.voter_id
                        && r.registration_type == registration.registration_type
                }) {
                    return Err(duplicate_registration(registration));
                }
                records.push(registration.clone());
                Ok(())
            },
        )
    }

    fn list_registrations(&self) -> Result<Vec<InterestRegistration>> {
        self.list(Collection::InterestRegistrations)
    }
}
