//! End-to-end rendering tests for ptree.
//!
//! Every test replays a recorded snapshot, so output does not depend on the
//! processes running on the test machine. stdout is a pipe here: no width
//! limit, and ASCII connectors unless another style is requested.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"[
  {"pid": 1, "ppid": 0, "uid": 0, "comm": "init", "argv": ["/sbin/init"]},
  {"pid": 2, "ppid": 0, "uid": 0, "comm": "kthreadd"},
  {"pid": 3, "ppid": 2, "uid": 0, "comm": "kworker/0:0", "kernel_thread": true},
  {"pid": 100, "ppid": 1, "uid": 0, "comm": "getty", "argv": ["/sbin/getty", "tty1"]},
  {"pid": 101, "ppid": 1, "uid": 0, "comm": "getty", "argv": ["/sbin/getty", "tty2"]},
  {"pid": 400, "ppid": 1, "uid": 0, "comm": "sshd", "argv": ["/usr/sbin/sshd", "-D"]},
  {"pid": 410, "ppid": 400, "uid": 4242424, "comm": "bash", "argv": ["-bash"]},
  {"pid": 420, "ppid": 410, "uid": 4242424, "comm": "vim", "argv": ["vim", "notes.txt"]}
]"#;

fn snapshot_file() -> NamedTempFile {
    let file = NamedTempFile::new().expect("create snapshot file");
    std::fs::write(file.path(), SNAPSHOT).expect("write snapshot file");
    file
}

/// ptree reading `snapshot`, with a neutral environment.
fn ptree(snapshot: &NamedTempFile) -> Command {
    let mut cmd = cargo_bin_cmd!("ptree");
    cmd.arg("--snapshot")
        .arg(snapshot.path())
        .env_remove("PTREE_SNAPSHOT")
        .env_remove("PTREE_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(args: &[&str]) -> String {
    let snapshot = snapshot_file();
    let output = ptree(&snapshot).args(args).output().expect("run ptree");
    assert!(output.status.success(), "{output:?}");
    String::from_utf8(output.stdout).expect("utf-8 output")
}

// ============================================================================
// Layout
// ============================================================================

mod layout {
    use super::*;

    #[test]
    fn default_tree_is_compacted() {
        assert_eq!(
            stdout_of(&[]),
            "init-+-2*[getty]\n     `-sshd---bash---vim\n"
        );
    }

    #[test]
    fn no_compact_lists_every_process() {
        assert_eq!(
            stdout_of(&["-c"]),
            "init-+-getty\n     |-getty\n     `-sshd---bash---vim\n"
        );
    }

    #[test]
    fn kernel_processes_on_request() {
        assert_eq!(
            stdout_of(&["-k"]),
            "init-+-2*[getty]\n     `-sshd---bash---vim\nkthreadd---kworker/0:0\n"
        );
    }

    #[test]
    fn pids_disable_compaction() {
        assert_eq!(
            stdout_of(&["-p"]),
            "init(1)-+-getty(100)\n        |-getty(101)\n        `-sshd(400)---bash(410)---vim(420)\n"
        );
    }

    #[test]
    fn numeric_sort_orders_by_pid() {
        let text = stdout_of(&["-n", "-p", "1"]);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("init(1)-+-getty(100)"));
        assert!(lines[2].contains("sshd(400)"));
    }

    #[test]
    fn arguments_give_each_process_a_line() {
        assert_eq!(
            stdout_of(&["-a", "400"]),
            "sshd -D\n  `-bash\n      `-vim notes.txt\n"
        );
    }

    #[test]
    fn titles_replace_command_names() {
        assert_eq!(stdout_of(&["-t", "410"]), "-bash---vim\n");
    }

    #[test]
    fn uid_changes_name_the_new_owner() {
        assert_eq!(
            stdout_of(&["-u", "400"]),
            "sshd---bash(4242424)---vim\n"
        );
    }
}

// ============================================================================
// Selection
// ============================================================================

mod selection {
    use super::*;

    #[test]
    fn positional_pid() {
        assert_eq!(stdout_of(&["400"]), "sshd---bash---vim\n");
        assert_eq!(stdout_of(&["0x190"]), "sshd---bash---vim\n");
    }

    #[test]
    fn pid_option() {
        assert_eq!(stdout_of(&["--pid=410"]), "bash---vim\n");
    }

    #[test]
    fn show_parents_draws_the_chain() {
        assert_eq!(stdout_of(&["-s", "410"]), "init---sshd---bash---vim\n");
    }

    #[test]
    fn missing_pid_prints_nothing() {
        assert_eq!(stdout_of(&["9999"]), "");
    }

    #[test]
    fn glob_selects_matching_roots() {
        assert_eq!(stdout_of(&["-g", "get*"]), "2*[getty]\n");
        assert_eq!(stdout_of(&["-g", "get*", "-c"]), "getty\ngetty\n");
    }

    #[test]
    fn regex_selects_matching_roots() {
        assert_eq!(stdout_of(&["-r", "^vi"]), "vim\n");
        assert_eq!(stdout_of(&["-r", "sh"]), "sshd---bash---vim\n");
    }

    #[test]
    fn last_selection_wins() {
        assert_eq!(stdout_of(&["--pid=400", "-r", "^vi"]), "vim\n");
        assert_eq!(stdout_of(&["-r", "^vi", "--pid=400"]), "sshd---bash---vim\n");
    }

    #[test]
    fn highlight_without_equals_leaves_the_positional() {
        // `-H 400` highlights this ptree process and selects pid 400.
        assert_eq!(stdout_of(&["-H", "400"]), "sshd---bash---vim\n");
    }

    #[test]
    fn snapshot_from_environment() {
        let snapshot = snapshot_file();
        cargo_bin_cmd!("ptree")
            .env("PTREE_SNAPSHOT", snapshot.path())
            .arg("420")
            .assert()
            .success()
            .stdout("vim\n");
    }
}

// ============================================================================
// Styles
// ============================================================================

mod styles {
    use super::*;

    #[test]
    fn highlight_is_bold() {
        let text = stdout_of(&["-c", "-H=410"]);
        assert!(text.contains("\x1b[1minit\x1b[22m"), "{text:?}");
        assert!(text.contains("\x1b[1mbash\x1b[22m"), "{text:?}");
        assert!(!text.contains("\x1b[1mvim"), "{text:?}");
    }

    #[test]
    fn vt100_uses_graphics_charset() {
        let text = stdout_of(&["-G", "400"]);
        assert_eq!(text, "sshd\x1b(0\x0fqqq\x1b(B\x0fbash\x1b(0\x0fqqq\x1b(B\x0fvim\n");
    }

    #[test]
    fn unicode_falls_back_without_utf8_locale() {
        let snapshot = snapshot_file();
        ptree(&snapshot)
            .env("LC_ALL", "C")
            .args(["-U", "400"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\x1b(0\x0f"));
    }

    #[test]
    fn later_style_flag_wins() {
        assert_eq!(stdout_of(&["-G", "-A", "400"]), "sshd---bash---vim\n");
    }
}

// ============================================================================
// Informational output
// ============================================================================

mod info {
    use super::*;

    #[test]
    fn help_succeeds() {
        cargo_bin_cmd!("ptree")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Display a tree of processes"))
            .stdout(predicate::str::contains("--show-parents"));
    }

    #[test]
    fn short_version() {
        cargo_bin_cmd!("ptree")
            .arg("-V=short")
            .assert()
            .success()
            .stdout(format!("ptree {}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn full_version_names_the_host() {
        cargo_bin_cmd!("ptree")
            .arg("-V")
            .assert()
            .success()
            .stdout(predicate::str::starts_with(format!(
                "ptree {} - ",
                env!("CARGO_PKG_VERSION")
            )));
    }

    #[test]
    fn license_version() {
        cargo_bin_cmd!("ptree")
            .arg("--version=license")
            .assert()
            .success()
            .stdout(predicate::str::contains("MIT License"));
    }
}
