use std::{ops::AddAssign, sync::Arc, time::Duration};

use anyhow::Result;
use thiserror::Error;
use tokio::{
    sync::{Mutex, Semaphore},
    task::JoinSet,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::data::{ExtractRecord, FileKind, FileRecord, GameTranslation};
use crate::core::store::TranslationStore;
use crate::core::translate::{
    Answers, BackendError, BpeTokenCounter, ConversationId, OperatorPrompt, Question, ReplyError,
    TokenCounter, TranslationBackend,
    batch::{build_questions, group_by_file, group_phrases, partition},
    build_instruction, parse_answers,
};
use crate::utils::{quote_wrap, trim_quotes};

const ESCALATION_NOTICE: &str = "The backend returned untranslated text. Steer the conversation until \
     the reply is usable, then enter exit to process the last reply. An invalid reply skips the question.";

/// Why a question produced no answers.
#[derive(Error, Debug)]
enum QuestionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Tunables of a translation run.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub workers: usize,
    pub token_budget: usize,
    pub source_language: String,
    pub target_language: String,
    pub timeout_cooldown: Duration,
    pub error_cooldown: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.translation_threads.max(1),
            token_budget: config.token_budget,
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            timeout_cooldown: Duration::from_secs(config.timeout_cooldown_secs),
            error_cooldown: Duration::from_secs(config.error_cooldown_secs),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Counters of one translation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    /// Candidates left after deduplication.
    pub pending: usize,
    /// Records that received a translation.
    pub translated: usize,
    /// Script records that reused a structured translation.
    pub reused: usize,
    pub questions: usize,
    pub skipped_questions: usize,
    pub escalations: usize,
}

impl AddAssign for TranslationSummary {
    fn add_assign(&mut self, other: Self) {
        self.pending += other.pending;
        self.translated += other.translated;
        self.reused += other.reused;
        self.questions += other.questions;
        self.skipped_questions += other.skipped_questions;
        self.escalations += other.escalations;
    }
}

/// Drives candidates through the backend into the store.
///
/// Cheap to clone; every worker task holds its own handle.
#[derive(Clone)]
pub struct TranslationOrchestrator {
    backend: Arc<dyn TranslationBackend>,
    operator: Arc<dyn OperatorPrompt>,
    tokens: Arc<dyn TokenCounter>,
    store: Arc<TranslationStore>,
    settings: Arc<OrchestratorSettings>,
    /// One operator dialogue at a time.
    operator_lock: Arc<Mutex<()>>,
}

impl TranslationOrchestrator {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        operator: Arc<dyn OperatorPrompt>,
        tokens: Arc<dyn TokenCounter>,
        store: Arc<TranslationStore>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            backend,
            operator,
            tokens,
            store,
            settings: Arc::new(settings),
            operator_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Orchestrator sized by `config`, counting tokens with the tokenizer of its model.
    pub fn from_config(
        backend: Arc<dyn TranslationBackend>,
        operator: Arc<dyn OperatorPrompt>,
        store: Arc<TranslationStore>,
        config: &Config,
    ) -> Result<Self> {
        let tokens = BpeTokenCounter::for_model(&config.model)?;
        Ok(Self::new(
            backend,
            operator,
            Arc::new(tokens),
            store,
            OrchestratorSettings::from_config(config),
        ))
    }

    /// Translate candidates of one file kind. Candidates of another kind are ignored.
    pub async fn translate(
        &self,
        kind: FileKind,
        candidates: Vec<(FileRecord, ExtractRecord)>,
    ) -> Result<TranslationSummary> {
        let snapshot = Arc::new(self.store.read_game().await?);

        let mut pending: Vec<(FileRecord, ExtractRecord)> = candidates
            .into_iter()
            .filter(|(file, record)| {
                file.kind == kind
                    && !snapshot
                        .get(kind, &file.key(), &record.path)
                        .is_some_and(ExtractRecord::has_translation)
            })
            .collect();
        pending.sort_by(|(a, _), (b, _)| a.path.cmp(&b.path));

        let mut summary = TranslationSummary {
            pending: pending.len(),
            ..Default::default()
        };
        if pending.is_empty() {
            return Ok(summary);
        }

        let file_count = {
            let mut files: Vec<&FileRecord> = pending.iter().map(|(f, _)| f).collect();
            files.dedup();
            files.len()
        };
        info!(
            target: "backend",
            "Translating {} texts from {} {} files with {}",
            pending.len(),
            file_count,
            kind,
            self.backend.provider_name()
        );

        let workers = Arc::new(Semaphore::new(self.settings.workers));
        let mut tasks = JoinSet::new();
        for (index, batch) in partition(pending, self.settings.workers)
            .into_iter()
            .enumerate()
        {
            let this = self.clone();
            let workers = Arc::clone(&workers);
            let snapshot = Arc::clone(&snapshot);
            tasks.spawn(async move {
                let _permit = workers.acquire_owned().await?;
                debug!(target: "backend", "Starting batch {} with {} extracts", index, batch.len());
                this.run_batch(batch, &snapshot).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(batch_summary)) => summary += batch_summary,
                Ok(Err(err)) => warn!(target: "backend", "Translation batch failed: {:#}", err),
                Err(err) => warn!(target: "backend", "Translation batch aborted: {}", err),
            }
        }

        info!(
            target: "backend",
            "Translated {} of {} texts ({} questions, {} skipped)",
            summary.translated,
            summary.pending,
            summary.questions,
            summary.skipped_questions
        );
        Ok(summary)
    }

    async fn run_batch(
        &self,
        batch: Vec<(FileRecord, ExtractRecord)>,
        snapshot: &GameTranslation,
    ) -> Result<TranslationSummary> {
        let mut summary = TranslationSummary::default();
        for (file, records) in group_by_file(batch) {
            summary += self.translate_file(&file, records, snapshot).await?;
        }
        Ok(summary)
    }

    async fn translate_file(
        &self,
        file: &FileRecord,
        mut records: Vec<ExtractRecord>,
        snapshot: &GameTranslation,
    ) -> Result<TranslationSummary> {
        let mut summary = TranslationSummary::default();
        let mut phrases = group_phrases(&records);

        if file.kind == FileKind::Script {
            let mut reused = Vec::new();
            phrases.retain(|phrase| {
                match structured_translation(snapshot, trim_quotes(&phrase.value)) {
                    Some(translated) => {
                        reused.push((phrase.value.clone(), quote_wrap(translated)));
                        false
                    }
                    None => true,
                }
            });
            if !reused.is_empty() {
                let accepted = apply_translations(&mut records, &reused);
                summary.reused += accepted.len();
                summary.translated += accepted.len();
                self.store.write_batch(file, &accepted).await?;
            }
        }

        let questions = build_questions(phrases, self.tokens.as_ref(), self.settings.token_budget);
        let total = questions.len();
        for (index, question) in questions.iter().enumerate() {
            info!(target: "backend", "{} {}/{}", file.key(), index + 1, total);
            summary.questions += 1;

            let answers = match self.ask_question(file, question, &mut summary).await {
                Ok(answers) => answers,
                Err(err) => {
                    summary.skipped_questions += 1;
                    self.cool_down(&err).await;
                    continue;
                }
            };

            let mut translations = Vec::new();
            for (key, translated) in answers {
                match question.phrase_for(&key) {
                    Some(phrase) => translations.push((phrase.value.clone(), translated)),
                    None => warn!(target: "backend", "Failed to find extract path {} from answer", key),
                }
            }

            let accepted = apply_translations(&mut records, &translations);
            summary.translated += accepted.len();
            self.store.write_batch(file, &accepted).await?;
        }

        Ok(summary)
    }

    /// One backend round-trip for a question, escalating to the operator when
    /// the reply leaves any phrase untranslated.
    async fn ask_question(
        &self,
        file: &FileRecord,
        question: &Question,
        summary: &mut TranslationSummary,
    ) -> Result<Answers, QuestionError> {
        let conversation = ConversationId::fresh();
        let instruction = build_instruction(
            &self.settings.source_language,
            &self.settings.target_language,
            &file.file_name(),
            question,
        );

        let reply = self.ask(conversation, &instruction).await?;
        let answers = parse_answers(&reply)?;

        let untranslated = question
            .phrases
            .iter()
            .find(|phrase| answers.get(phrase.answer_key()) == Some(&phrase.value));
        if let Some(phrase) = untranslated {
            info!(
                target: "backend",
                "Detected non translated value for {}, swapping to manual mode",
                phrase.answer_key()
            );
            summary.escalations += 1;
            return self.escalate(conversation).await;
        }

        Ok(answers)
    }

    /// Let the operator talk to the backend in `conversation` until `exit`,
    /// then parse the last reply. An invalid reply yields no answers.
    async fn escalate(&self, conversation: ConversationId) -> Result<Answers, QuestionError> {
        let _dialogue = self.operator_lock.lock().await;
        self.operator.notify(ESCALATION_NOTICE).await;

        let mut last_reply = String::new();
        while let Some(line) = self.operator.read_line().await {
            if line.trim() == "exit" {
                break;
            }
            last_reply = self.ask(conversation, &line).await?;
            self.operator.notify(&last_reply).await;
        }

        match parse_answers(&last_reply) {
            Ok(answers) => Ok(answers),
            Err(err) => {
                warn!(target: "backend", "Manual response was not valid, skipping ({})", err);
                Ok(Answers::new())
            }
        }
    }

    async fn ask(&self, conversation: ConversationId, message: &str) -> Result<String, BackendError> {
        debug!(
            target: "backend",
            "Asking ({}) (tokens: {}): {}",
            conversation,
            self.tokens.count(message),
            message
        );
        let reply = self.backend.ask(conversation, message).await?;
        debug!(
            target: "backend",
            "Answer ({}) (tokens: {}): {}",
            conversation,
            self.tokens.count(&reply),
            reply
        );
        Ok(reply)
    }

    async fn cool_down(&self, err: &QuestionError) {
        let pause = match err {
            QuestionError::Backend(BackendError::Timeout) => self.settings.timeout_cooldown,
            QuestionError::Backend(_) => self.settings.error_cooldown,
            QuestionError::Reply(_) => Duration::ZERO,
        };
        warn!(
            target: "backend",
            "Question skipped: {}, moving on after {}s",
            err,
            pause.as_secs()
        );
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}

/// Translation of the first translated structured record with this original value.
fn structured_translation<'a>(game: &'a GameTranslation, value: &str) -> Option<&'a str> {
    game.structured_files
        .values()
        .flat_map(|extracts| extracts.values())
        .find(|record| record.value == value && record.has_translation())
        .and_then(|record| record.translated.as_deref())
}

/// Set the translation of every record sharing a translated value. Returns the
/// records that changed.
fn apply_translations(
    records: &mut [ExtractRecord],
    translations: &[(String, String)],
) -> Vec<ExtractRecord> {
    let mut accepted = Vec::new();
    for (value, translated) in translations {
        for record in records.iter_mut().filter(|r| &r.value == value) {
            record.translated = Some(translated.clone());
            accepted.push(record.clone());
        }
    }
    accepted
}
