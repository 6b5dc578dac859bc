// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use rssgrab::application::use_cases::fetch_feed::FetchFeedUseCase;
use rssgrab::config::settings::Settings;
use rssgrab::engines::cdp_engine::CdpEngine;
use rssgrab::engines::headless_chrome_engine::HeadlessChromeEngine;
use rssgrab::engines::router::EngineRouter;
use rssgrab::engines::traits::BrowserEngine;
use rssgrab::infrastructure::storage::LocalFileStorage;
use rssgrab::utils::telemetry;
use std::backtrace::BacktraceStatus;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 抓取一次RSS并写入配置的输出文件，失败时以非零状态退出
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Initialize logging
    telemetry::init_telemetry();

    finish(run().await)
}

/// 把运行结果转换为进程退出码，失败时把错误链写到标准错误
fn finish(result: anyhow::Result<PathBuf>) -> ExitCode {
    match result {
        Ok(path) => {
            info!("Saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprint!("{}", render_report(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<PathBuf> {
    // 2. Load configuration
    let settings = Arc::new(Settings::new().context("Failed to load configuration")?);
    info!("Starting rssgrab for {}", settings.fetch.target_url);

    // 3. Initialize engines, primary first
    let engines: Vec<Arc<dyn BrowserEngine>> =
        vec![Arc::new(CdpEngine), Arc::new(HeadlessChromeEngine)];
    let router = Arc::new(EngineRouter::new(engines, settings.clone()));

    // 4. Initialize storage
    let storage = Arc::new(LocalFileStorage::new(&settings.fetch.output_path));

    let use_case = FetchFeedUseCase::new(router, storage);
    Ok(use_case.execute().await?)
}

fn render_report(err: &anyhow::Error) -> String {
    let mut report = format!("Error: {}\n", err);

    let backtrace = err.backtrace();
    if backtrace.status() == BacktraceStatus::Captured {
        report.push_str(&format!("Stack trace:\n{}\n", backtrace));
    }

    for cause in err.chain().skip(1) {
        report.push_str(&format!("Cause: {}\n", cause));
    }
    report
}
