fn main() -> Result<(), Box<dyn std::error::Error>> {
    cevap::cli::main()
}
