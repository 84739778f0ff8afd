use async_trait::async_trait;
use powerblockade_application::ports::{KeyGenerator, PackageBuilder};
use powerblockade_domain::DomainError;
use ring::rand::{SecureRandom, SystemRandom};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Node API keys: 48 random bytes, URL-safe base64 → exactly 64 chars.
pub struct RingKeyGenerator {
    rng: SystemRandom,
}

impl RingKeyGenerator {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for RingKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for RingKeyGenerator {
    fn generate(&self) -> String {
        use base64::Engine as _;
        let mut bytes = [0u8; 48];
        // SystemRandom only fails when the OS RNG is broken; there is no
        // reasonable fallback at that point.
        self.rng.fill(&mut bytes).expect("system RNG unavailable");
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Builds the zipped deployment bundle for a new secondary: compose file,
/// `.env` with the primary URL and node key, recursor templates, and the
/// RPZ loader script.
pub struct ZipPackageBuilder;

impl ZipPackageBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZipPackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageBuilder for ZipPackageBuilder {
    async fn build(
        &self,
        node_name: &str,
        primary_url: &str,
        node_api_key: &str,
    ) -> Result<Vec<u8>, DomainError> {
        let env = format!(
            "NODE_NAME={node_name}\nPRIMARY_URL={primary_url}\nPRIMARY_API_KEY={node_api_key}\n"
        );
        let readme = render_readme(node_name);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let entries: [(&str, &str); 7] = [
            ("docker-compose.yml", COMPOSE_TEMPLATE),
            (".env", &env),
            ("README.md", &readme),
            ("config/recursor.conf.template", RECURSOR_TEMPLATE),
            ("config/rpz.lua", RPZ_LUA),
            ("config/forward-zones.conf", "# managed by primary\n"),
            ("rpz/.gitkeep", ""),
        ];

        for (name, content) in entries {
            writer
                .start_file(name, options)
                .and_then(|()| writer.write_all(content.as_bytes()).map_err(Into::into))
                .map_err(|e| DomainError::IoError(format!("zip entry '{name}': {e}")))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| DomainError::IoError(format!("zip finish: {e}")))?;
        Ok(cursor.into_inner())
    }
}

fn render_readme(node_name: &str) -> String {
    format!(
        "# PowerBlockade Secondary Node: {node_name}\n\
         \n\
         ## Quick start\n\
         \n\
         1. Copy this folder to your secondary host\n\
         2. Review `.env` (set PRIMARY_URL to the primary Admin UI URL)\n\
         3. Run:\n\
         \n\
            docker compose up -d\n\
         \n\
         ## Notes\n\
         \n\
         - This node registers with the primary using `PRIMARY_API_KEY`.\n\
         - Events and metrics flow to the primary through the sync API.\n"
    )
}

const COMPOSE_TEMPLATE: &str = r#"services:
  recursor:
    image: powerdns/pdns-recursor-51:latest
    restart: unless-stopped
    environment:
      TZ: ${TIMEZONE:-UTC}
      RECURSOR_API_KEY: ${RECURSOR_API_KEY:-change-me}
    ports:
      - "53:53/udp"
      - "53:53/tcp"
    volumes:
      - ./config/recursor.conf.template:/etc/pdns-recursor/recursor.conf.template:ro
      - ./config/rpz.lua:/etc/pdns-recursor/rpz.lua:ro
      - ./config/forward-zones.conf:/etc/pdns-recursor/forward-zones.conf:ro
      - ./rpz:/etc/pdns-recursor/rpz
      - dnstap-socket:/var/run/dnstap
    cap_add:
      - NET_BIND_SERVICE

  dnstap-processor:
    image: powerblockade/dnstap-processor:latest
    restart: unless-stopped
    environment:
      NODE_NAME: ${NODE_NAME}
      DNSTAP_SOCKET: /var/run/dnstap/dnstap.sock
      PRIMARY_URL: ${PRIMARY_URL}
      PRIMARY_API_KEY: ${PRIMARY_API_KEY}
    volumes:
      - dnstap-socket:/var/run/dnstap
    depends_on:
      - recursor

  sync-agent:
    image: powerblockade/sync-agent:latest
    restart: unless-stopped
    environment:
      NODE_NAME: ${NODE_NAME}
      PRIMARY_URL: ${PRIMARY_URL}
      PRIMARY_API_KEY: ${PRIMARY_API_KEY}
      HEARTBEAT_INTERVAL_SECONDS: ${HEARTBEAT_INTERVAL_SECONDS:-60}
    volumes:
      - ./config:/config
      - ./rpz:/rpz

volumes:
  dnstap-socket:
"#;

const RECURSOR_TEMPLATE: &str = r#"# Rendered at container start; the sync-agent may replace this.
local-address=0.0.0.0
local-port=53
allow-from=0.0.0.0/0, ::/0
threads=2
pdns-distributes-queries=yes
lua-config-file=/etc/pdns-recursor/rpz.lua
forward-zones-file=/etc/pdns-recursor/forward-zones.conf
dnstap=yes
dnstap-log-queries=yes
dnstap-log-responses=yes
dnstap-socket=/var/run/dnstap/dnstap.sock
webserver=yes
webserver-address=0.0.0.0
webserver-port=8082
api-key=${RECURSOR_API_KEY}
prometheus-listen-address=0.0.0.0:9090
"#;

const RPZ_LUA: &str = r#"rpzFile("/etc/pdns-recursor/rpz/blocklist-combined.rpz", {
  policyName = "blocklist-combined",
  defpol = Policy.NXDOMAIN,
})

rpzFile("/etc/pdns-recursor/rpz/whitelist.rpz", {
  policyName = "whitelist",
  defpol = Policy.PASSTHRU,
})
"#;
