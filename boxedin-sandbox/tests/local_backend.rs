use boxedin_core::sandbox::{Sandbox, SandboxConfig, SandboxRequest, StreamKind};
use boxedin_core::tool::Language;
use boxedin_sandbox::ProcessSandbox;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn python3_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn runs_a_python_tool_and_streams_stdout() {
    if !python3_available() {
        eprintln!("skipping: python3 not available in this environment");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let tool_dir = dir.path().join("tools/echo");
    tokio::fs::create_dir_all(&tool_dir).await.unwrap();
    tokio::fs::write(
        tool_dir.join("main.py"),
        "import sys\nprint('hello from sandbox')\n",
    )
    .await
    .unwrap();

    let sandbox = ProcessSandbox::new(
        dir.path(),
        SandboxConfig {
            force_local: true,
            timeout_ms: 5_000,
            ..SandboxConfig::default()
        },
    );

    let chunks: Arc<Mutex<Vec<(StreamKind, Vec<u8>)>>> = Arc::new(Mutex::new(Vec::new()));
    let chunks_cb = chunks.clone();
    let on_chunk = move |kind: StreamKind, data: &[u8]| {
        chunks_cb.lock().unwrap().push((kind, data.to_vec()));
    };

    let outcome = sandbox
        .run(
            SandboxRequest {
                language: Language::Python,
                entry: "tools/echo/main.py".to_string(),
                args: vec![],
                stdin: None,
                run_id: "run-local-1".to_string(),
                tool_dir: PathBuf::from("tools/echo"),
            },
            &on_chunk,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout.contains("hello from sandbox"));
    assert!(!chunks.lock().unwrap().is_empty());

    let log_contents = tokio::fs::read_to_string(&outcome.log_file).await.unwrap();
    assert!(log_contents.contains("hello from sandbox"));
}

#[tokio::test]
async fn timeout_kills_a_long_running_tool() {
    if !python3_available() {
        eprintln!("skipping: python3 not available in this environment");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let tool_dir = dir.path().join("tools/sleepy");
    tokio::fs::create_dir_all(&tool_dir).await.unwrap();
    tokio::fs::write(tool_dir.join("main.py"), "import time\ntime.sleep(10)\n")
        .await
        .unwrap();

    let sandbox = ProcessSandbox::new(
        dir.path(),
        SandboxConfig {
            force_local: true,
            timeout_ms: 200,
            ..SandboxConfig::default()
        },
    );

    let outcome = sandbox
        .run(
            SandboxRequest {
                language: Language::Python,
                entry: "tools/sleepy/main.py".to_string(),
                args: vec![],
                stdin: None,
                run_id: "run-local-2".to_string(),
                tool_dir: PathBuf::from("tools/sleepy"),
            },
            &|_, _| {},
        )
        .await
        .unwrap();

    assert_ne!(outcome.code, 0);
}

#[tokio::test]
async fn unknown_entry_produces_a_negative_code_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(dir.path().join("tools/missing"))
        .await
        .unwrap();

    let sandbox = ProcessSandbox::new(
        dir.path(),
        SandboxConfig {
            force_local: true,
            ..SandboxConfig::default()
        },
    );

    let outcome = sandbox
        .run(
            SandboxRequest {
                language: Language::Python,
                entry: "tools/missing/does_not_exist.py".to_string(),
                args: vec![],
                stdin: None,
                run_id: "run-local-3".to_string(),
                tool_dir: PathBuf::from("tools/missing"),
            },
            &|_, _| {},
        )
        .await
        .unwrap();

    assert_ne!(outcome.code, 0);
}
