//! Iteration loop integration tests
//!
//! Drives the full controller with a mock LLM client, real child processes
//! (`sh` as the interpreter) and artifacts in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use autocoder::artifact::FileArtifactStore;
use autocoder::controller::IterationController;
use autocoder::domain::{Intent, Termination};
use autocoder::execution::{Classification, ExecutionConfig, ProcessExecutor};
use autocoder::generation::GenerationClient;
use autocoder::llm::{MockLlmClient, MockReply};
use autocoder::prompt::PromptSet;
use tempfile::TempDir;

struct Setup {
    _temp: TempDir,
    out: PathBuf,
    llm: Arc<MockLlmClient>,
    controller: IterationController<MockLlmClient, ProcessExecutor, FileArtifactStore>,
}

fn controller(
    llm: &Arc<MockLlmClient>,
    out: &Path,
    budget: u32,
    timeout: Duration,
) -> IterationController<MockLlmClient, ProcessExecutor, FileArtifactStore> {
    let generation = GenerationClient::new(Arc::clone(llm), "mock-model", PromptSet::default()).unwrap();
    let executor = ProcessExecutor::new(ExecutionConfig::new(timeout).interpreter(Some("sh".to_string())));
    let store = FileArtifactStore::new(out, "generated_code", "sh");
    IterationController::new(generation, Arc::new(executor), Arc::new(store), budget)
}

fn setup(replies: Vec<MockReply>, budget: u32, timeout: Duration) -> Setup {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("generated_code");
    let llm = Arc::new(MockLlmClient::new(replies));
    let controller = controller(&llm, &out, budget, timeout);

    Setup {
        _temp: temp,
        out,
        llm,
        controller,
    }
}

fn pid_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_error_is_fixed_then_improvement_stalls() {
    let broken = "echo 'Traceback: boom' >&2";
    let fixed = "echo 'all good'";
    let mut s = setup(
        vec![MockReply::code(broken), MockReply::code(fixed), MockReply::code(fixed)],
        5,
        Duration::from_secs(5),
    );

    let report = s.controller.run("print a greeting").await.unwrap();

    assert_eq!(report.termination, Termination::NoProgress { intent: Intent::Improve });
    assert_eq!(report.last_iteration, 2);
    assert_eq!(report.rounds, 2);

    assert_eq!(report.artifacts.len(), 2);
    assert!(report.artifacts[0].starts_with(&s.out));
    assert!(report.artifacts[0].ends_with("generated_code_1.sh"));
    assert_eq!(fs::read_to_string(&report.artifacts[0]).unwrap(), broken);
    assert_eq!(fs::read_to_string(&report.artifacts[1]).unwrap(), fixed);

    let history = s.controller.state().history();
    let classes: Vec<Classification> = history
        .iter()
        .map(|r| r.outcome.as_ref().unwrap().classification)
        .collect();
    assert_eq!(classes, vec![Classification::Error, Classification::Success]);

    // the fix request carried the real stderr
    let fix_request = &s.llm.requests()[1];
    assert!(fix_request.user().unwrap().contains("STDERR:\nTraceback: boom"));
}

#[tokio::test]
async fn test_timeout_is_improved_and_child_is_gone() {
    let slow = "exec sleep 30";
    let mut s = setup(
        vec![MockReply::code(slow), MockReply::code(slow)],
        5,
        Duration::from_millis(300),
    );

    let report = s.controller.run("loop forever").await.unwrap();

    assert_eq!(report.termination, Termination::NoProgress { intent: Intent::Improve });

    let outcome = s.controller.state().history()[0].outcome.clone().unwrap();
    assert_eq!(outcome.classification, Classification::Timeout);
    assert!(!pid_alive(outcome.pid.unwrap()));

    assert!(s.llm.requests()[1].system().unwrap().contains("code improver"));
}

#[tokio::test]
async fn test_background_process_does_not_stall_the_loop() {
    let detached = "sleep 4 &\necho started";
    let mut s = setup(
        vec![MockReply::code(detached), MockReply::code(detached)],
        5,
        Duration::from_millis(300),
    );

    let started = std::time::Instant::now();
    let report = s.controller.run("start a server").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
    assert_eq!(report.termination, Termination::NoProgress { intent: Intent::Improve });
    let outcome = s.controller.state().history()[0].outcome.clone().unwrap();
    assert_eq!(outcome.classification, Classification::Timeout);
}

#[tokio::test]
async fn test_rerun_into_same_output_directory() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("generated_code");

    let mut reports = Vec::new();
    for code in ["echo first", "echo second"] {
        let llm = Arc::new(MockLlmClient::new(vec![MockReply::code(code), MockReply::code(code)]));
        let mut controller = controller(&llm, &out, 5, Duration::from_secs(5));
        reports.push(controller.run("greet").await.unwrap());
    }

    let runs: Vec<_> = fs::read_dir(&out).unwrap().collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(fs::read_to_string(&reports[0].artifacts[0]).unwrap(), "echo first");
    assert_eq!(fs::read_to_string(&reports[1].artifacts[0]).unwrap(), "echo second");
}

#[tokio::test]
async fn test_budget_bounds_rounds_and_artifacts() {
    let replies = (1..=4).map(|i| MockReply::code(format!("echo version {}", i))).collect();
    let mut s = setup(replies, 2, Duration::from_secs(5));

    let report = s.controller.run("count").await.unwrap();

    assert_eq!(report.termination, Termination::BudgetExhausted);
    assert_eq!(report.rounds, 2);
    assert_eq!(report.artifacts.len(), 3);
    assert!(report.last_artifact().unwrap().ends_with("generated_code_3.sh"));
    // one scripted reply left over
    assert_eq!(s.llm.remaining(), 1);
}

#[tokio::test]
async fn test_unwritable_output_aborts_before_execution() {
    let mut s = setup(vec![MockReply::code("echo hi")], 5, Duration::from_secs(5));
    fs::create_dir_all(s.out.parent().unwrap()).unwrap();
    fs::write(&s.out, "a file where the directory should be").unwrap();

    let err = s.controller.run("anything").await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(s.controller.state().iteration_count(), 0);
    assert!(s.controller.state().history().is_empty());
}

#[tokio::test]
async fn test_no_code_in_first_reply_writes_nothing() {
    let mut s = setup(vec![MockReply::text("I would rather not.")], 5, Duration::from_secs(5));

    let report = s.controller.run("anything").await.unwrap();

    assert!(matches!(report.termination, Termination::NoInitialCode { .. }));
    assert!(!s.out.exists());
}
