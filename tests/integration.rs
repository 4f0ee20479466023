use std::{fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[population]\n"
        + "pc_count = 20\n"
        + "s0_mean = 0.8\n"
        + "s0_variation = 0.1\n"
        + "dtf_min = 7\n"
        + "dtf_max = 30\n"
        + "\n"
        + "[simulation]\n"
        + "timesteps = 60\n"
        + "gas_density_factor = 0.0000192\n"
        + "trial_count = 10\n"
        + "seed = 7\n"
        + "\n"
        + "[rates]\n"
        + "prop = [ 0.5, 1.0, 2.5,]\n"
        + "malf = [ 10.0, 25.0, 40.0,]\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_pneusim"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "run"]);
    run_bin(&["--sim-dir", test_dir_str, "run"]);

    assert!(test_dir.join("run-0000/ensemble.msgpack").is_file());
    assert!(test_dir.join("run-0001/ensemble.msgpack").is_file());

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    assert!(test_dir.join("run-0000/results.json").is_file());
    assert!(test_dir.join("run-0001/results.json").is_file());

    run_bin(&["--sim-dir", test_dir_str, "clean"]);

    assert!(!test_dir.join("run-0000").exists());
    assert!(test_dir.join("config.toml").is_file());

    fs::remove_dir_all(&test_dir).ok();
}
