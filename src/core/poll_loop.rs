use crate::core::Pipeline;
use crate::domain::model::PollReport;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

/// 固定間隔重複執行 extract → transform → load；
/// 單輪失敗只記錄，不中斷迴圈。
pub struct PollLoop<P: Pipeline> {
    pipeline: P,
    interval: Duration,
}

impl<P: Pipeline> PollLoop<P> {
    pub fn new(pipeline: P, interval: Duration) -> Self {
        Self { pipeline, interval }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// 執行一輪；報表的 `started_at` 由 load 階段填入
    pub async fn run_cycle(&self) -> Result<PollReport> {
        tracing::debug!("Polling modem...");
        let records = self.pipeline.extract().await?;

        let transformed = self.pipeline.transform(records).await?;
        tracing::debug!(
            "Parsed {} of {} messages",
            transformed.transactions.len(),
            transformed.listed
        );

        self.pipeline.load(transformed).await
    }

    /// 執行到 `shutdown` 完成為止，回傳已完成的輪數
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;

        tracing::info!("Starting poll loop (interval {:?})", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                outcome = self.run_cycle() => {
                    cycles += 1;
                    log_cycle(cycles, outcome);
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Poll loop stopped after {} cycles", cycles);
        cycles
    }
}

fn log_cycle(cycle: usize, outcome: Result<PollReport>) {
    match outcome {
        Ok(report) => {
            tracing::info!(
                "Cycle {} done: listed {}, parsed {}, rejected {}, inserted {}, duplicates {}, failed {}",
                cycle,
                report.listed,
                report.parsed,
                report.rejected,
                report.inserted,
                report.duplicates,
                report.failed
            );
        }
        Err(e) => {
            tracing::error!(
                "Cycle {} aborted: {} (Category: {:?}, Severity: {:?})",
                cycle,
                e,
                e.category(),
                e.severity()
            );
        }
    }
}
