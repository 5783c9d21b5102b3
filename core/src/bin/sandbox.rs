fn main() {
    gofer_core::sandbox::worker::run();
}
