//! Host/guest turn loop and closing summary

use chrono::{DateTime, Utc};
use std::io::Write;

use crate::config::{RoleSettings, Settings};
use crate::dialogue::episode::Episode;
use crate::dialogue::theme::{extract_theme, CoveredThemes};
use crate::dialogue::transcript::{build_history, Speakers, Transcript, Turn};
use crate::dialogue::Role;
use crate::llm::prompts::{
    build_guest_prompt, build_plain_host_prompt, build_summary_prompt, build_themed_host_prompt,
};
use crate::llm::{is_retryable, CompletionRequest, LlmProvider};
use crate::{BanterError, Result};

/// Mutable state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    /// Everything said so far
    pub transcript: Transcript,

    /// Question/answer rounds still to go
    pub iteration: u32,

    /// What the podcast is about
    pub topic: String,

    /// Number of the last question asked
    pub question_num: u32,

    /// Turns counted toward the cap
    pub total_turns: u32,

    /// Angles the host has already taken
    pub themes: CoveredThemes,

    /// When the run started
    pub started_at: DateTime<Utc>,
}

impl RunState {
    pub fn new(topic: impl Into<String>, iterations: u32) -> Self {
        Self {
            transcript: Transcript::new(),
            iteration: iterations,
            topic: topic.into(),
            question_num: 0,
            total_turns: 0,
            themes: CoveredThemes::new(),
            started_at: Utc::now(),
        }
    }
}

/// Drives the conversation between the configured roles.
///
/// Transcript lines and the summary are written to `out`; everything else
/// goes through `tracing`.
pub struct DialogueDriver<'a, W: Write> {
    provider: &'a dyn LlmProvider,
    settings: &'a Settings,
    out: W,
}

impl<'a, W: Write> DialogueDriver<'a, W> {
    pub fn new(provider: &'a dyn LlmProvider, settings: &'a Settings, out: W) -> Self {
        Self {
            provider,
            settings,
            out,
        }
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    fn speakers(&self) -> Speakers<'a> {
        Speakers {
            host: &self.settings.host.name,
            guest: &self.settings.guest.name,
        }
    }

    /// Run the whole episode: the turn loop, then the summary.
    pub async fn run(&mut self) -> Result<Episode> {
        let settings = self.settings;
        let dialogue = &settings.dialogue;
        let mut state = RunState::new(dialogue.topic.clone(), dialogue.iterations);

        tracing::info!(
            "Starting {} dialogue on {:?} ({} iterations, max {} turns)",
            dialogue.variant,
            dialogue.topic,
            dialogue.iterations,
            dialogue.max_turns
        );

        self.drive(&mut state).await?;
        let summary = self.summarize(&state).await?;

        tracing::info!(
            "Dialogue finished after {} turns ({} themes covered)",
            state.transcript.len(),
            state.themes.len()
        );

        Ok(Episode {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: state.started_at,
            topic: state.topic,
            variant: dialogue.variant,
            host: settings.host.name.clone(),
            guest: settings.guest.name.clone(),
            transcript: state.transcript,
            themes: state.themes,
            summary,
        })
    }

    /// Alternate host and guest turns until either budget runs out.
    pub async fn drive(&mut self, state: &mut RunState) -> Result<()> {
        let max_turns = self.settings.dialogue.max_turns;
        let counts_answers = self.settings.dialogue.variant.counts_answers();

        while state.iteration > 0 && state.total_turns < max_turns {
            writeln!(self.out, "{}", "-".repeat(65))?;
            writeln!(self.out, "Turn: {}", state.total_turns + 1)?;

            self.ask_question(state).await?;
            state.total_turns += 1;
            if state.total_turns >= max_turns {
                break;
            }

            self.answer_question(state).await?;
            if counts_answers {
                state.total_turns += 1;
            }
        }

        writeln!(self.out, "---- loop end ---")?;
        Ok(())
    }

    /// Host turn: ask the next question.
    pub async fn ask_question(&mut self, state: &mut RunState) -> Result<()> {
        let speakers = self.speakers();
        let history = build_history(
            state.transcript.turns(),
            self.settings.dialogue.history_pairs,
            speakers,
        );

        let themed = self.settings.dialogue.variant.tracks_themes();
        let prompt = if themed {
            build_themed_host_prompt(
                speakers.host,
                speakers.guest,
                &state.topic,
                &history,
                state.themes.as_slice(),
            )
        } else {
            build_plain_host_prompt(speakers.host, speakers.guest, &state.topic, &history)
        };

        let question = self
            .complete(Role::Host, &self.settings.host, &prompt)
            .await?;

        state.question_num += 1;
        writeln!(
            self.out,
            "\nQ{} ({}): {}\n",
            state.question_num, speakers.host, question
        )?;

        if themed && !question.is_empty() {
            let theme = extract_theme(&question);
            tracing::debug!("Question {} theme: {:?}", state.question_num, theme);
            state.themes.insert(theme);
        }
        state.transcript.push(Turn::Question(question));

        Ok(())
    }

    /// Guest turn: answer the latest question and spend one iteration.
    pub async fn answer_question(&mut self, state: &mut RunState) -> Result<()> {
        let speakers = self.speakers();
        let question = state
            .transcript
            .last_question()
            .ok_or_else(|| BanterError::Other("No question to answer yet".to_string()))?;

        let prompt = build_guest_prompt(speakers.guest, speakers.host, &state.topic, question);
        let answer = self
            .complete(Role::Guest, &self.settings.guest, &prompt)
            .await?;

        writeln!(self.out, "{}: {}\n", speakers.guest, answer)?;
        state.transcript.push(Turn::Answer(answer));

        state.iteration = state.iteration.saturating_sub(1);
        writeln!(self.out, "Remaining Iterations: {}", state.iteration)?;

        Ok(())
    }

    /// Ask the summarizer for takeaways over the full transcript.
    pub async fn summarize(&mut self, state: &RunState) -> Result<String> {
        let conversation = state.transcript.render(self.speakers());
        let prompt = build_summary_prompt(&conversation);

        let summary = self
            .complete(Role::Summarizer, &self.settings.summarizer, &prompt)
            .await?;

        writeln!(self.out, "\n--- Podcast Summary ---\n{}\n", summary)?;
        Ok(summary)
    }

    /// One model call with the configured retry budget. Only transient
    /// failures are retried. Replies are trimmed.
    async fn complete(&self, role: Role, config: &RoleSettings, prompt: &str) -> Result<String> {
        let request = CompletionRequest::for_role(config, prompt);
        let attempts = self.settings.llm.max_retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            tracing::debug!("Calling {} model {} (attempt {})", role, config.model, attempt);

            match self.provider.complete(request).await {
                Ok(reply) => return Ok(reply.trim().to_string()),
                Err(e) if attempt < attempts && is_retryable(&e) => {
                    tracing::warn!(
                        "{} model call failed (attempt {}/{}): {:#}",
                        role,
                        attempt,
                        attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    return Err(BanterError::Inference {
                        role,
                        message: format!("{:#}", e),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::dialogue::Variant;

    /// Replies with numbered text per model and records every prompt.
    #[derive(Default)]
    struct EchoLlm {
        prompts: Mutex<Vec<(String, String)>>,
        failures: Mutex<VecDeque<&'static str>>,
        rejected: Mutex<u32>,
        silent: Option<&'static str>,
    }

    impl EchoLlm {
        fn failing_with(failures: &[&'static str]) -> Self {
            Self {
                prompts: Mutex::default(),
                failures: Mutex::new(failures.iter().copied().collect()),
                ..Self::default()
            }
        }

        /// Every call is refused with a 404, as for an unknown model.
        fn rejecting() -> Self {
            Self {
                rejected: Mutex::new(u32::MAX),
                ..Self::default()
            }
        }

        /// `model` answers with whitespace only.
        fn silent(model: &'static str) -> Self {
            Self {
                silent: Some(model),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompts_for(&self, model: &str) -> Vec<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, _)| m == model)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    #[async_trait]
    impl LlmProvider for EchoLlm {
        async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<String> {
            if let Some(failure) = self.failures.lock().unwrap().pop_front() {
                anyhow::bail!(failure);
            }
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push((request.model.to_string(), request.prompt.to_string()));
            let mut rejected = self.rejected.lock().unwrap();
            if *rejected > 0 {
                *rejected -= 1;
                return Err(crate::llm::RejectedRequest {
                    status: 404,
                    message: format!("model '{}' not found", request.model),
                }
                .into());
            }
            if self.silent.is_some_and(|m| m == request.model) {
                return Ok("   \n".to_string());
            }
            let n = prompts.iter().filter(|(m, _)| m == request.model).count();
            Ok(format!("  {} reply {}  \n", request.model, n))
        }
    }

    fn settings(iterations: u32, max_turns: u32, variant: Variant) -> Settings {
        let mut settings = Settings::default();
        settings.host.model = "host".to_string();
        settings.guest.model = "guest".to_string();
        settings.summarizer.model = "summary".to_string();
        settings.dialogue.iterations = iterations;
        settings.dialogue.max_turns = max_turns;
        settings.dialogue.variant = variant;
        settings
    }

    #[test]
    fn single_iteration_runs_one_round() {
        let llm = EchoLlm::default();
        let settings = settings(1, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 1);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        assert_eq!(state.iteration, 0);
        assert_eq!(state.total_turns, 1);
        assert_eq!(
            state.transcript.turns(),
            [
                Turn::Question("host reply 1".to_string()),
                Turn::Answer("guest reply 1".to_string()),
            ]
        );
    }

    #[test]
    fn themed_cap_counts_only_questions() {
        let llm = EchoLlm::default();
        let settings = settings(10, 3, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 10);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        // Q A Q A Q, then the cap stops the loop before the third answer.
        assert_eq!(state.total_turns, 3);
        assert_eq!(state.transcript.len(), 5);
        assert_eq!(state.iteration, 8);
        assert!(state.transcript.turns().last().unwrap().is_question());
    }

    #[test]
    fn plain_cap_counts_every_utterance() {
        let llm = EchoLlm::default();
        let settings = settings(10, 3, Variant::Plain);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 10);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        assert_eq!(state.total_turns, 3);
        assert_eq!(state.transcript.len(), 3);
        assert_eq!(state.iteration, 9);
        assert!(state.themes.is_empty());
        assert!(!llm.prompts_for("host")[0].contains("covered themes"));
    }

    #[test]
    fn zero_iterations_skip_straight_to_loop_end() {
        let llm = EchoLlm::default();
        let settings = settings(0, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 0);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        assert!(state.transcript.is_empty());
        let out = String::from_utf8(driver.into_output()).unwrap();
        assert_eq!(out, "---- loop end ---\n");
    }

    #[test]
    fn first_host_prompt_uses_sentinels() {
        let llm = EchoLlm::default();
        let settings = settings(2, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("Why Agile fails?", 2);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        let host_prompts = llm.prompts_for("host");
        assert_eq!(host_prompts.len(), 2);
        assert!(host_prompts[0].contains("No previous questions yet."));
        assert!(host_prompts[0].contains("covered themes: None yet"));
        assert!(host_prompts[1].contains("Sana: host reply 1\nSara: guest reply 1"));
        assert!(host_prompts[1].contains("covered themes: host reply 1"));
    }

    #[test]
    fn run_prints_transcript_and_summary() {
        let llm = EchoLlm::default();
        let settings = settings(1, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());

        let episode = tokio_test::block_on(driver.run()).unwrap();
        let out = String::from_utf8(driver.into_output()).unwrap();

        assert!(out.contains("Turn: 1\n"));
        assert!(out.contains("\nQ1 (Sana): host reply 1\n"));
        assert!(out.contains("Sara: guest reply 1\n"));
        assert!(out.contains("Remaining Iterations: 0\n"));
        assert!(out.contains("---- loop end ---\n\n--- Podcast Summary ---\nsummary reply 1\n"));

        assert_eq!(episode.summary, "summary reply 1");
        assert_eq!(episode.transcript.len(), 2);
        assert_eq!(episode.themes.as_slice(), ["host reply 1"]);

        let summary_prompt = &llm.prompts_for("summary")[0];
        assert!(summary_prompt.contains("Sana: host reply 1\nSara: guest reply 1"));
    }

    #[test]
    fn failed_call_aborts_without_appending() {
        let llm = EchoLlm::failing_with(&["connection refused"]);
        let settings = settings(3, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 3);

        let err = tokio_test::block_on(driver.drive(&mut state)).unwrap_err();

        match err {
            BanterError::Inference { role, message } => {
                assert_eq!(role, Role::Host);
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(state.transcript.is_empty());
        assert_eq!(state.iteration, 3);
    }

    #[test]
    fn retries_recover_from_transient_failures() {
        let llm = EchoLlm::failing_with(&["timeout", "timeout"]);
        let mut settings = settings(1, 10, Variant::Themed);
        settings.llm.max_retries = 2;
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 1);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        assert_eq!(state.transcript.len(), 2);
    }

    #[test]
    fn rejected_call_is_not_retried() {
        let llm = EchoLlm::rejecting();
        let mut settings = settings(1, 10, Variant::Themed);
        settings.llm.max_retries = 3;
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 1);

        let err = tokio_test::block_on(driver.drive(&mut state)).unwrap_err();

        match err {
            BanterError::Inference { role, message } => {
                assert_eq!(role, Role::Host);
                assert!(message.contains("not found"), "{}", message);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(llm.calls(), 1);
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn blank_question_adds_no_theme() {
        let llm = EchoLlm::silent("host");
        let settings = settings(2, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 2);

        tokio_test::block_on(driver.drive(&mut state)).unwrap();

        assert_eq!(state.transcript.turns()[0], Turn::Question(String::new()));
        assert!(state.themes.is_empty());
        let host_prompts = llm.prompts_for("host");
        assert!(host_prompts[1].contains("covered themes: None yet"));
    }

    #[test]
    fn answering_without_a_question_is_an_error() {
        let llm = EchoLlm::default();
        let settings = settings(1, 10, Variant::Themed);
        let mut driver = DialogueDriver::new(&llm, &settings, Vec::new());
        let mut state = RunState::new("t", 1);

        let err = tokio_test::block_on(driver.answer_question(&mut state)).unwrap_err();
        assert!(err.to_string().contains("No question to answer"));
        assert_eq!(state.iteration, 1);
    }
}
