use chrono::Local;

fn main() {
    // Stamped into the CLI version string
    let build_date = Local::now().format("%Y-%m-%d").to_string();
    println!("cargo:rustc-env=RIPPLE_BUILD_DATE={build_date}");

    println!("cargo:rerun-if-changed=build.rs");
}
