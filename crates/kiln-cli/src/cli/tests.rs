use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli() {
    Cli::command().debug_assert();
}

#[test]
fn build_defaults() {
    let cli = Cli::try_parse_from(["kiln", "build"]).unwrap();
    let Command::Build(args) = cli.command else {
        panic!("expected build");
    };
    assert_eq!(args.project.root, std::path::PathBuf::from("."));
    assert!(args.project.profile.is_none());
    assert!(args.format.is_empty());
    assert!(!args.minify && !args.sourcemap && !args.no_dts);
}

#[test]
fn build_accepts_comma_separated_formats() {
    let cli = Cli::try_parse_from(["kiln", "build", "--format", "es,umd", "-f", "cjs"]).unwrap();
    let Command::Build(args) = cli.command else {
        panic!("expected build");
    };
    assert_eq!(args.format, vec![Format::Es, Format::Umd, Format::Cjs]);
}

#[test]
fn rejects_unknown_format() {
    assert!(Cli::try_parse_from(["kiln", "build", "--format", "amd"]).is_err());
}

#[test]
fn global_flags_follow_subcommand() {
    let cli = Cli::try_parse_from(["kiln", "check", "--deny-warnings", "-q", "--no-color"]).unwrap();
    assert!(cli.quiet);
    assert!(cli.no_color);
    let Command::Check(args) = cli.command else {
        panic!("expected check");
    };
    assert!(args.deny_warnings);
}

#[test]
fn verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["kiln", "-v", "-q", "print"]).is_err());
}

#[test]
fn project_args_are_shared() {
    let cli = Cli::try_parse_from(["kiln", "print", "-C", "packages/ui", "--profile", "prod"]).unwrap();
    let Command::Print(args) = cli.command else {
        panic!("expected print");
    };
    assert_eq!(args.project.root, std::path::PathBuf::from("packages/ui"));
    assert_eq!(args.project.profile.as_deref(), Some("prod"));
}
