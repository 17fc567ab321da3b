use crate::domain::model::{AttemptFailure, AttemptOutcome, ProbeAttempt, ProbeResult};
use crate::domain::ports::HealthCheck;
use crate::utils::error::{AppError, Result};
use chrono::Utc;
use std::time::{Duration, Instant};

/// 重試前的等待策略，兩種曲線皆為單調不遞減
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// `delay(i) = min(step * i, max)`
    Linear { step: Duration, max: Duration },
    /// `delay(i) = min(base * 2^(i-1), max)`
    Exponential { base: Duration, max: Duration },
}

impl BackoffPolicy {
    /// 第 `attempt` 次（從 1 起算）失敗後、下一次嘗試前的等待時間
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match *self {
            BackoffPolicy::Linear { step, max } => step.saturating_mul(attempt).min(max),
            BackoffPolicy::Exponential { base, max } => {
                let shift = (attempt - 1).min(31);
                base.saturating_mul(1u32 << shift).min(max)
            }
        }
    }

    /// 從設定值建立，`kind` 為 `linear` 或 `exponential`
    pub fn from_config(kind: &str, base: Duration, max: Duration) -> Result<Self> {
        if max < base {
            return Err(AppError::InvalidConfigValueError {
                field: "probe.max_delay_ms".to_string(),
                value: max.as_millis().to_string(),
                reason: format!("Must not be smaller than the base delay ({:?})", base),
            });
        }

        match kind.to_ascii_lowercase().as_str() {
            "linear" => Ok(BackoffPolicy::Linear { step: base, max }),
            "exponential" => Ok(BackoffPolicy::Exponential { base, max }),
            other => Err(AppError::InvalidConfigValueError {
                field: "probe.backoff".to_string(),
                value: other.to_string(),
                reason: "Supported policies: linear, exponential".to_string(),
            }),
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Exponential {
            base: Duration::from_millis(500),
            max: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff: BackoffPolicy,
}

impl ProbeSettings {
    pub fn new(max_attempts: u32, timeout: Duration, backoff: BackoffPolicy) -> Self {
        Self {
            max_attempts,
            timeout,
            backoff,
        }
    }

    /// 一次探測最長可能耗時：每次嘗試的 timeout 加上每段退避延遲
    pub fn worst_case_duration(&self) -> Duration {
        let attempts = self.max_attempts.max(1);
        let waits: Duration = (1..attempts).map(|i| self.backoff.delay(i)).sum();
        self.timeout.saturating_mul(attempts) + waits
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout: Duration::from_secs(5),
            backoff: BackoffPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Probing { attempt: u32 },
    Succeeded { attempts: u32 },
    ExhaustedRetries { attempts: u32 },
}

impl ProbeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProbeState::Succeeded { .. } | ProbeState::ExhaustedRetries { .. }
        )
    }
}

/// 完整的探測紀錄，包含每次嘗試與實際等待的延遲
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub result: ProbeResult,
    pub final_state: ProbeState,
    pub attempts: Vec<ProbeAttempt>,
    pub delays: Vec<Duration>,
}

/// 後端連線探測：有上限的重試與單調遞增的退避延遲。
///
/// 每次執行都是獨立的狀態機 `Idle -> Probing(1..N) -> Succeeded | ExhaustedRetries`，
/// 嘗試之間嚴格循序，連線失敗以 [`ProbeResult`] 回報而不是錯誤。
pub struct ConnectivityProbe<H: HealthCheck> {
    check: H,
    settings: ProbeSettings,
}

impl<H: HealthCheck> ConnectivityProbe<H> {
    pub fn new(check: H, settings: ProbeSettings) -> Self {
        Self { check, settings }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub async fn run(&self) -> ProbeResult {
        self.run_detailed().await.result
    }

    pub async fn run_detailed(&self) -> ProbeReport {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut state = ProbeState::Idle;
        let mut attempts = Vec::with_capacity(max_attempts as usize);
        let mut delays = Vec::new();
        let mut last_error: Option<String> = None;

        tracing::info!(
            "🚀 Starting connectivity probe (max {} attempts, worst case {:?})",
            max_attempts,
            self.settings.worst_case_duration()
        );

        for index in 1..=max_attempts {
            advance(&mut state, ProbeState::Probing { attempt: index });

            let timestamp = Utc::now();
            let started = Instant::now();
            let outcome = match tokio::time::timeout(self.settings.timeout, self.check.check()).await
            {
                Ok(Ok(())) => AttemptOutcome::Success,
                Ok(Err(failure)) => AttemptOutcome::Failure(failure),
                Err(_) => AttemptOutcome::Failure(AttemptFailure::Timeout),
            };
            let latency = started.elapsed();

            attempts.push(ProbeAttempt {
                index,
                timestamp,
                outcome: outcome.clone(),
                latency,
            });

            match outcome {
                AttemptOutcome::Success => {
                    tracing::info!(
                        "✅ Backend reachable on attempt {}/{} ({:?})",
                        index,
                        max_attempts,
                        latency
                    );
                    advance(&mut state, ProbeState::Succeeded { attempts: index });
                    break;
                }
                AttemptOutcome::Failure(failure) => {
                    tracing::warn!(
                        "⚠️ Probe attempt {}/{} failed: {} ({:?})",
                        index,
                        max_attempts,
                        failure,
                        latency
                    );
                    last_error = Some(failure.to_string());

                    if index < max_attempts {
                        let delay = self.settings.backoff.delay(index);
                        tracing::debug!("Waiting {:?} before attempt {}", delay, index + 1);
                        tokio::time::sleep(delay).await;
                        delays.push(delay);
                    }
                }
            }
        }

        if !state.is_terminal() {
            advance(
                &mut state,
                ProbeState::ExhaustedRetries {
                    attempts: max_attempts,
                },
            );
        }

        let result = match state {
            ProbeState::Succeeded { attempts } => ProbeResult::succeeded(attempts),
            ProbeState::ExhaustedRetries { attempts } => {
                tracing::error!(
                    "❌ Backend unreachable after {} attempts: {}",
                    attempts,
                    last_error.as_deref().unwrap_or("unknown error")
                );
                ProbeResult::exhausted(attempts, last_error)
            }
            // 迴圈結束後必為終止狀態
            ProbeState::Idle | ProbeState::Probing { .. } => {
                ProbeResult::exhausted(attempts.len() as u32, last_error)
            }
        };

        ProbeReport {
            result,
            final_state: state,
            attempts,
            delays,
        }
    }
}

fn advance(state: &mut ProbeState, next: ProbeState) {
    tracing::debug!("Probe state {:?} -> {:?}", state, next);
    *state = next;
}
