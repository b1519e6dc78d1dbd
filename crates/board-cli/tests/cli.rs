use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ADMIN: &str = "lead@example.com";

struct Board {
    dir: TempDir,
}

impl Board {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            format!("[moderation]\nadmins = [\"{}\"]\n", ADMIN),
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn cmd(&self, user: Option<&str>) -> Command {
        let mut cmd = Command::cargo_bin("painboard").unwrap();
        cmd.current_dir(self.path())
            .env_remove("PAINBOARD_USER")
            .env_remove("PAINBOARD_NAME")
            .env_remove("PAINBOARD_DEPARTMENT")
            .env_remove("PAINBOARD_DATA_DIR")
            .arg("--no-color")
            .arg("--config")
            .arg(self.path().join("config.toml"))
            .arg("--data-dir")
            .arg(self.path().join("data"));
        if let Some(user) = user {
            cmd.arg("--user").arg(user);
        }
        cmd
    }

    fn submit(&self, user: &str, title: &str, extra: &[&str]) -> String {
        let output = self
            .cmd(Some(user))
            .args(["submit", "--json", "--title", title])
            .args(extra)
            .output()
            .unwrap();
        assert!(output.status.success(), "{:?}", output);
        let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        view["id"].as_str().unwrap().to_string()
    }

    fn approve(&self, id: &str) {
        self.cmd(Some(ADMIN))
            .args(["moderate", "approve", id])
            .assert()
            .success();
    }

    fn listing(&self, user: Option<&str>) -> serde_json::Value {
        let output = self.cmd(user).args(["list", "--json"]).output().unwrap();
        assert!(output.status.success(), "{:?}", output);
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn test_help() {
    Command::cargo_bin("painboard")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("moderate"));
}

#[test]
fn test_submit_requires_user() {
    let board = Board::new();
    board
        .cmd(None)
        .args(["submit", "--title", "Printer jams weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--user"));
}

#[test]
fn test_printer_jams_weekly() {
    let board = Board::new();
    let id = board.submit(
        "jane@example.com",
        "Printer jams weekly",
        &["--challenge", "Jams every Monday", "--impact", "Lost mornings"],
    );

    // Pending submissions are not on the board
    assert_eq!(board.listing(None).as_array().unwrap().len(), 0);

    board.approve(&id);
    assert_eq!(board.listing(None)[0]["submission"]["title"], "Printer jams weekly");

    board
        .cmd(Some("a@example.com"))
        .args(["vote", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 votes"));
    board
        .cmd(Some("a@example.com"))
        .args(["vote", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already voted"));
    board
        .cmd(Some("b@example.com"))
        .args(["vote", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 votes"));

    board
        .cmd(Some(ADMIN))
        .args(["moderate", "archive", &id])
        .assert()
        .success();
    assert_eq!(board.listing(None).as_array().unwrap().len(), 0);

    board
        .cmd(Some(ADMIN))
        .args(["moderate", "restore", &id])
        .assert()
        .success();
    let listing = board.listing(Some("a@example.com"));
    assert_eq!(listing[0]["vote_count"], 2);
    assert_eq!(listing[0]["has_voted"], true);
}

#[test]
fn test_concurrent_vote_processes_all_count() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Printer jams weekly", &[]);
    board.approve(&id);

    const VOTERS: usize = 12;
    std::thread::scope(|s| {
        for n in 0..VOTERS {
            let board = &board;
            let id = id.as_str();
            s.spawn(move || {
                board
                    .cmd(Some(&format!("voter{}@example.com", n)))
                    .args(["vote", id])
                    .assert()
                    .success()
                    .stdout(predicate::str::contains("Vote recorded"));
            });
        }
    });

    assert_eq!(board.listing(None)[0]["vote_count"], VOTERS);
    let leftovers: Vec<_> = fs::read_dir(board.path().join("data"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_moderation_requires_admin() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Slow VPN", &[]);

    board
        .cmd(Some("jane@example.com"))
        .args(["moderate", "approve", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an admin"));
}

#[test]
fn test_illegal_transition() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Slow VPN", &[]);

    board
        .cmd(Some(ADMIN))
        .args(["moderate", "archive", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot archive a submission that is pending"));
}

#[test]
fn test_reject_with_yes() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Cold office", &[]);

    board
        .cmd(Some(ADMIN))
        .args(["moderate", "reject", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn test_anonymous_submission_hidden() {
    let board = Board::new();
    let id = board.submit(
        "jane@example.com",
        "Unfair rota",
        &["--anonymous"],
    );
    board.approve(&id);

    let output = board
        .cmd(Some(ADMIN))
        .args(["list", "--status", "approved", "--json"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Anonymous"));
    assert!(!stdout.contains("jane"));

    board
        .cmd(None)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Anonymous").and(predicate::str::contains("jane").not()));
}

#[test]
fn test_comments_in_order() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Printer jams weekly", &[]);
    board.approve(&id);

    board
        .cmd(Some("sarah@example.com"))
        .args(["--name", "Sarah Chen", "comment", "add", &id, "First!"])
        .assert()
        .success();
    board
        .cmd(Some("michael@example.com"))
        .args(["comment", "add", &id, "Second", "--anonymous"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 comments"));

    let output = board
        .cmd(None)
        .args(["comment", "list", &id, "--json"])
        .output()
        .unwrap();
    let thread: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(thread["entries"][0]["content"], "First!");
    assert_eq!(thread["entries"][0]["display_name"], "Sarah Chen");
    assert_eq!(thread["entries"][1]["display_name"], "Anonymous");
}

#[test]
fn test_comment_list_hidden_until_approved() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Printer jams weekly", &[]);

    board
        .cmd(Some("sam@example.com"))
        .args(["comment", "list", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not on the board"));
    board
        .cmd(Some(ADMIN))
        .args(["comment", "list", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("No comments yet"));
}

#[test]
fn test_submit_help_names_impact_prompt() {
    Command::cargo_bin("painboard")
        .unwrap()
        .args(["submit", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "What are the operational/business implications?",
        ));
}

#[test]
fn test_comment_requires_user() {
    let board = Board::new();
    let id = board.submit("jane@example.com", "Printer jams weekly", &[]);
    board.approve(&id);

    board
        .cmd(None)
        .args(["comment", "add", &id, "Hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sign in"));
}

#[test]
fn test_poll_results_gated() {
    let board = Board::new();
    board
        .cmd(Some(ADMIN))
        .args([
            "poll", "create", "-q", "Fix what first?", "-o", "Printers", "-o", "Parking", "-o",
            "Claims",
        ])
        .assert()
        .success();

    board
        .cmd(Some("a@example.com"))
        .args(["poll", "results"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vote in the poll"));

    board
        .cmd(Some("a@example.com"))
        .args(["poll", "vote", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100%"));
    board
        .cmd(Some("b@example.com"))
        .args(["poll", "vote", "1"])
        .assert()
        .success();
    board
        .cmd(Some("c@example.com"))
        .args(["poll", "vote", "2"])
        .assert()
        .success();

    let output = board
        .cmd(Some("a@example.com"))
        .args(["poll", "results", "--json"])
        .output()
        .unwrap();
    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results["total"], 3);
    assert_eq!(results["options"][0]["percentage"], 67);
    assert_eq!(results["options"][1]["percentage"], 33);
    assert_eq!(results["options"][2]["percentage"], 0);
}

#[test]
fn test_poll_create_requires_two_options() {
    let board = Board::new();
    board
        .cmd(Some(ADMIN))
        .args(["poll", "create", "-q", "Yes?", "-o", "Yes"])
        .assert()
        .failure();
}

#[test]
fn test_interest_export_csv() {
    let board = Board::new();
    board
        .cmd(Some("jane@example.com"))
        .args(["interest", "register", "--role", "product-sponsor", "--role", "hacker"])
        .assert()
        .success();
    board
        .cmd(Some("tom@example.com"))
        .args(["interest", "register", "--coach"])
        .assert()
        .success();
    board
        .cmd(Some("tom@example.com"))
        .args(["interest", "register", "--coach"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered as a Coach"));

    board
        .cmd(Some(ADMIN))
        .args(["interest", "export"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("\"Email\",\"Roles\",\"Registered At\"\n")
                .and(predicate::str::contains(
                    "\"jane@example.com\",\"Product Sponsor, Hacker (Developer)\"",
                ))
                .and(predicate::str::contains("\"tom@example.com\",\"Coach\"")),
        );

    let out_dir = board.path().join("exports");
    board
        .cmd(Some(ADMIN))
        .args(["interest", "export", "--output"])
        .arg(&out_dir)
        .assert()
        .success();
    let files: Vec<_> = fs::read_dir(&out_dir).unwrap().collect();
    assert_eq!(files.len(), 1);
    let name = files[0].as_ref().unwrap().file_name();
    let name = name.to_string_lossy();
    assert!(name.starts_with("interest-registrations-"));
    assert!(name.ends_with(".csv"));
}

#[test]
fn test_interest_export_requires_admin() {
    let board = Board::new();
    board
        .cmd(Some("jane@example.com"))
        .args(["interest", "export"])
        .assert()
        .failure();
}

#[test]
fn test_config_validate() {
    let board = Board::new();
    board
        .cmd(None)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid TOML"));

    fs::write(board.path().join("config.toml"), "[comments]\nmax_length = 0\n").unwrap();
    board
        .cmd(None)
        .args(["config", "validate"])
        .assert()
        .failure();
}

#[test]
fn test_init_writes_config() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("painboard")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("PAINBOARD_DATA_DIR")
        .args(["--no-color", "init", "--local", "--admin", "Lead@Example.com"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join(".painboard/config.toml")).unwrap();
    assert!(content.contains("lead@example.com"));
    assert!(dir.path().join(".painboard/data").exists());
}
