fn main() {
    // Host builds (`--no-default-features`) have nothing to configure.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
