use std::net::UdpSocket;

/// Devine l'adresse IP locale de la machine.
///
/// Lie un socket UDP sur `0.0.0.0:0` puis le "connecte" vers un serveur DNS
/// public : le système choisit alors l'interface de sortie, dont on lit
/// l'adresse. Aucune donnée n'est émise (UDP est sans connexion).
///
/// Retourne `"127.0.0.1"` si aucune interface de sortie n'est trouvée.
pub fn guess_local_ip() -> String {
    let Ok(socket) = UdpSocket::bind("0.0.0.0:0") else {
        return "127.0.0.1".to_string();
    };
    if socket.connect("8.8.8.8:80").is_ok() {
        if let Ok(local) = socket.local_addr() {
            return local.ip().to_string();
        }
    }
    "127.0.0.1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn guess_local_ip_parses_as_ipv4() {
        let ip = guess_local_ip();
        let parsed: IpAddr = ip.parse().expect("should return a valid IP");
        assert!(parsed.is_ipv4());
    }

    #[test]
    fn guess_local_ip_is_loopback_or_assignable() {
        let ip = guess_local_ip();
        let parsed: IpAddr = ip.parse().unwrap();
        assert!(!parsed.is_multicast());
        assert!(!parsed.is_unspecified());
    }
}
