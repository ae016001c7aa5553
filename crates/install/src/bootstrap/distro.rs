//! Linux distribution detection for automatic Docker installation

/// Package manager family chosen from `/etc/os-release`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    /// Ubuntu and Debian through apt and Docker's repository. The
    /// distribution id picks the repository path.
    Apt { debian: bool },
    Dnf,
    Yum,
    AmazonLinux,
    Zypper,
    /// Anything unrecognized uses Docker's convenience script
    ConvenienceScript,
}

fn os_release_value<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
    contents.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        (k == key).then(|| v.trim().trim_matches('"').trim_matches('\''))
    })
}

fn family_for_id(id: &str) -> Option<DistroFamily> {
    match id {
        "ubuntu" => Some(DistroFamily::Apt { debian: false }),
        "debian" => Some(DistroFamily::Apt { debian: true }),
        "fedora" => Some(DistroFamily::Dnf),
        "rhel" | "centos" | "rocky" | "almalinux" => Some(DistroFamily::Yum),
        "amzn" => Some(DistroFamily::AmazonLinux),
        "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "sles" | "suse" => {
            Some(DistroFamily::Zypper)
        }
        _ => None,
    }
}

impl DistroFamily {
    /// Classify the contents of an os-release file, consulting `ID` first
    /// and then each entry of `ID_LIKE`.
    #[must_use]
    pub fn from_os_release(contents: &str) -> Self {
        let id = os_release_value(contents, "ID").map(str::to_ascii_lowercase);
        let like = os_release_value(contents, "ID_LIKE")
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        id.iter()
            .map(String::as_str)
            .chain(like.split_whitespace())
            .find_map(family_for_id)
            .unwrap_or(Self::ConvenienceScript)
    }

    /// Shell script installing Docker Engine and the compose plugin
    #[must_use]
    pub fn install_script(self) -> String {
        const PACKAGES: &str =
            "docker-ce docker-ce-cli containerd.io docker-buildx-plugin docker-compose-plugin";
        match self {
            Self::Apt { debian } => {
                let repo = if debian { "debian" } else { "ubuntu" };
                [
                    "apt-get update".to_string(),
                    "apt-get install -y ca-certificates curl gnupg".to_string(),
                    "install -m 0755 -d /etc/apt/keyrings".to_string(),
                    format!(
                        "curl -fsSL https://download.docker.com/linux/{repo}/gpg -o /etc/apt/keyrings/docker.asc"
                    ),
                    "chmod a+r /etc/apt/keyrings/docker.asc".to_string(),
                    format!(
                        "echo \"deb [arch=$(dpkg --print-architecture) signed-by=/etc/apt/keyrings/docker.asc] https://download.docker.com/linux/{repo} $(. /etc/os-release && echo \"${{UBUNTU_CODENAME:-$VERSION_CODENAME}}\") stable\" > /etc/apt/sources.list.d/docker.list"
                    ),
                    "apt-get update".to_string(),
                    format!("apt-get install -y {PACKAGES}"),
                ]
                .join(" && ")
            }
            Self::Dnf => format!(
                "dnf -y install dnf-plugins-core && dnf config-manager --add-repo https://download.docker.com/linux/fedora/docker-ce.repo && dnf install -y {PACKAGES}"
            ),
            Self::Yum => format!(
                "yum install -y yum-utils && yum-config-manager --add-repo https://download.docker.com/linux/centos/docker-ce.repo && yum install -y {PACKAGES}"
            ),
            Self::AmazonLinux => "yum install -y docker".to_string(),
            Self::Zypper => "zypper install -y docker docker-compose".to_string(),
            Self::ConvenienceScript => "curl -fsSL https://get.docker.com | sh".to_string(),
        }
    }

    /// Short label for logs and events
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Apt { .. } => "apt",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::AmazonLinux => "yum (amazon linux)",
            Self::Zypper => "zypper",
            Self::ConvenienceScript => "get.docker.com",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ubuntu_derivative_uses_upstream_codename() {
        let mint = "NAME=\"Linux Mint\"\nID=linuxmint\nID_LIKE=\"ubuntu debian\"\nVERSION_CODENAME=wilma\nUBUNTU_CODENAME=noble\n";
        let family = DistroFamily::from_os_release(mint);
        assert_eq!(family, DistroFamily::Apt { debian: false });

        let script = family.install_script();
        assert!(script.contains("linux/ubuntu $(. /etc/os-release"));
        assert!(script.contains("echo \"${UBUNTU_CODENAME:-$VERSION_CODENAME}\""));
    }

    #[test]
    fn test_detects_by_id() {
        let ubuntu = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nVERSION_CODENAME=noble\n";
        assert_eq!(
            DistroFamily::from_os_release(ubuntu),
            DistroFamily::Apt { debian: false }
        );
        assert_eq!(
            DistroFamily::from_os_release("ID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\n"),
            DistroFamily::Yum
        );
        assert_eq!(
            DistroFamily::from_os_release("ID=amzn\n"),
            DistroFamily::AmazonLinux
        );
    }

    #[test]
    fn test_falls_back_to_id_like() {
        let mint = "ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n";
        assert_eq!(
            DistroFamily::from_os_release(mint),
            DistroFamily::Apt { debian: false }
        );
    }

    #[test]
    fn test_unknown_uses_convenience_script() {
        let family = DistroFamily::from_os_release("ID=arch\n");
        assert_eq!(family, DistroFamily::ConvenienceScript);
        assert!(family.install_script().contains("get.docker.com"));
        assert_eq!(
            DistroFamily::from_os_release(""),
            DistroFamily::ConvenienceScript
        );
    }

    #[test]
    fn test_apt_script_uses_distribution_repo() {
        let script = DistroFamily::Apt { debian: true }.install_script();
        assert!(script.contains("download.docker.com/linux/debian"));
        assert!(script.contains("docker-compose-plugin"));
    }
}
