//! `loupe tools`: print the tool schemas advertised to the model.

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = loupe_tools::default_registry();

    for def in registry.definitions() {
        println!("{}", def.name);
        println!("   {}", def.description);
        println!("   {}", serde_json::to_string_pretty(&def.parameters)?.replace('\n', "\n   "));
        println!();
    }

    Ok(())
}
