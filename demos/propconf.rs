use propconf::*;
use std::collections::HashSet;

#[derive(Debug)]
struct Hosts;

impl PropertyConverter for Hosts {
    type Target = Vec<String>;

    fn convert(&self, value: &str) -> Result<Vec<String>, ConvertError> {
        Ok(value.split(',').map(|s| s.trim().to_owned()).collect())
    }
}

impl ConverterFactory for Hosts {
    fn create() -> Result<Self, ConvertError> {
        Ok(Hosts)
    }
}

#[configuration]
pub trait DatabaseConfig {
    #[config(key = "database.url")]
    fn get_url(&self) -> Result<url::Url, ConfigError>;
    #[config(key = "database.username")]
    fn get_username(&self) -> Result<String, ConfigError>;
    #[config(key = "database.password")]
    fn get_password(&self) -> Result<Option<String>, ConfigError>;
    #[config(key = "database.pool.size")]
    fn get_pool_size(&self) -> Result<u32, ConfigError>;
    #[config(key = "database.replicas", converter = "Hosts")]
    fn get_replicas(&self) -> Result<Vec<String>, ConfigError>;
    fn is_verbose(&self) -> Result<bool, ConfigError>;
    fn get_keys(&self) -> HashSet<String>;
}

fn main() -> Result<(), ConfigError> {
    env_logger::init();
    std::env::set_var("DATABASE_HOST", "localhost");
    set_system_property("database.pool.size", "16");

    let conf = ConfigurationBuilder::new()
        .with_property_source(SystemPropertiesSource::with_prefix("database."))
        .with_property_source(EnvPropertySource::new())
        .with_property_source(TomlPropertySource::new(
            "defaults",
            r#"
            verbose = "on"
            [database]
            url = "postgres://${databaseHost}:5432/app"
            username = "${user.name-propconf}"
            replicas = ["replica-1", "replica-2"]
            "#,
        )?)
        .with_property_source(MapPropertySource::new("fallback").set("user.name-propconf", "admin"))
        .build::<DatabaseConfigImpl>()?;

    println!("url      = {}", conf.get_url()?);
    println!("username = {}", conf.get_username()?);
    println!("password = {:?}", conf.get_password()?);
    println!("pool     = {}", conf.get_pool_size()?);
    println!("replicas = {:?}", conf.get_replicas()?);
    println!("verbose  = {}", conf.is_verbose()?);
    println!("keys     = {}", conf.get_keys().len());
    Ok(())
}
