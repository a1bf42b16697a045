use context_hierarchy::{BannerMode, HierarchyBuilder, InMemoryRuntime, Settings};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut runtime = InMemoryRuntime::new();

    // Parent and child, no banner
    let app = HierarchyBuilder::new()
        .sources(["Parent"])?
        .child(["Application"])?
        .banner_mode(BannerMode::Off)?
        .run(&mut runtime, &args)?;

    println!(
        "started context {} (parent {:?}) with args {:?}",
        app.id(),
        app.parent().map(|p| p.id()),
        app.args()
    );

    // Same shape, declared in settings with HIER__OPTIONS__* overrides
    let settings = Settings::builder()
        .with_file("demos/hierarchy.toml", false)
        .with_env("HIER", "__")
        .build()?;
    let mut from_settings = HierarchyBuilder::from_settings(&settings)?;
    if from_settings.hierarchy().is_empty() {
        from_settings.sources(["Parent"])?.child(["Application"])?;
    }
    let leaf = from_settings.run(&mut runtime, &args)?;
    println!("settings-declared leaf: {:?}", leaf.sources());

    Ok(())
}
