fn main() -> std::process::ExitCode {
    pwdlastset_report::run()
}
