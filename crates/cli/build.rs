use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("pagedown")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turn web pages, posts, videos and PDFs into Markdown")
        .arg(clap::arg!([URL] "Absolute http(s) URL to convert").required_unless_present("completions"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "User-Agent sent with every request"))
        .arg(clap::arg!(--"mirror-host" <HOST> "Host Twitter/X links are fetched from"))
        .arg(clap::arg!(--"metadata-timeout" <SECS> "Upper bound for reading page metadata, in seconds").default_value("5"))
        .arg(
            clap::arg!(--"caption-timeout" <SECS> "Upper bound for downloading video captions, in seconds")
                .default_value("15"),
        )
        .arg(clap::arg!(--"caption-lang" <LANG> "Preferred caption language for video transcripts").default_value("en"))
        .arg(clap::arg!(--"title-heading" "Start article output with the page title as a heading"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Print a shell completion script and exit")
                .value_name("SHELL")
                .value_parser(clap::value_parser!(clap_complete::Shell))
                .exclusive(true),
        );

    for shell in <clap_complete::Shell as clap::ValueEnum>::value_variants() {
        clap_complete::generate_to(*shell, &mut cmd, "pagedown", &completions_dir).unwrap();
    }
}
