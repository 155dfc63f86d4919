use super::ServiceContext;

pub const IMAGE: &str = "qmcgaw/gluetun";

/// Service block for a Gluetun container serving both proxies for one slot.
pub fn render(ctx: &ServiceContext<'_>) -> String {
    let i = ctx.slot.index();
    let http = ctx.slot.http_port();
    let socks = ctx.slot.socks5_port();

    let mut environment = format!(
        "      - VPN_SERVICE={service}\n      - VPN_TYPE=openvpn\n",
        service = ctx.vpn_service
    );
    if let Some(code) = ctx.location.prefix() {
        environment.push_str(&format!("      - SERVER_COUNTRIES={code}\n"));
    }
    environment.push_str(&format!(
        "      - TZ={tz}\n      - HTTPPROXY=on\n      - HTTPPROXY_PORT={http}\n      - SOCKS5=on\n      - SOCKS5_PORT={socks}\n",
        tz = ctx.timezone
    ));

    format!(
        r#"  gluetun_{i}:
    image: {IMAGE}
    container_name: gluetun_{service}_{i}
    cap_add:
      - NET_ADMIN
    devices:
      - /dev/net/tun
    env_file:
      - {env_file}
    environment:
{environment}    ports:
      - "{http}:{http}" # HTTP proxy
      - "{socks}:{socks}" # SOCKS5 proxy
    restart: unless-stopped
"#,
        service = ctx.vpn_service,
        env_file = ctx.env_file.display(),
    )
}
