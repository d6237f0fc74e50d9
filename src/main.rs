fn main() {
    protoidl::cli::run();
}
