//! Curated seed records

pub struct SeedCategory {
    pub name: &'static str,
    pub slug: &'static str,
    pub parent: Option<&'static str>,
}

pub struct SeedProprietary {
    pub name: &'static str,
    pub description: &'static str,
    pub website: &'static str,
    /// Category keywords, see `keywords`
    pub keywords: &'static [&'static str],
}

pub struct SeedAlternative {
    pub name: &'static str,
    pub description: &'static str,
    pub website: &'static str,
    pub github_url: Option<&'static str>,
    pub license: &'static str,
    pub self_hosted: bool,
    pub keywords: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub tech_stacks: &'static [&'static str],
    /// Names of the proprietary products it replaces
    pub replaces: &'static [&'static str],
}

const fn category(name: &'static str, slug: &'static str, parent: Option<&'static str>) -> SeedCategory {
    SeedCategory { name, slug, parent }
}

/// Parents are listed before their children
pub const CATEGORIES: &[SeedCategory] = &[
    category("Productivity", "productivity", None),
    category("Communication", "communication", None),
    category("Design & Graphics", "graphics-design", None),
    category("Media", "media", None),
    category("Development", "development", None),
    category("Infrastructure", "infrastructure", None),
    category("Web", "web", None),
    category("Office Suites", "office-suites", Some("productivity")),
    category("Note Taking", "note-taking", Some("productivity")),
    category("Project Management", "project-management", Some("productivity")),
    category("Team Chat", "team-chat", Some("communication")),
    category("Video Conferencing", "video-conferencing", Some("communication")),
    category("Email", "email", Some("communication")),
    category("Image Editing", "image-editing", Some("graphics-design")),
    category("Vector Graphics", "vector-graphics", Some("graphics-design")),
    category("UI Design", "ui-design", Some("graphics-design")),
    category("3D Modeling", "3d-modeling", Some("graphics-design")),
    category("Video Editing", "video-editing", Some("media")),
    category("Audio Editing", "audio-editing", Some("media")),
    category("Media Servers", "media-servers", Some("media")),
    category("Code Editors", "code-editors", Some("development")),
    category("Developer Tools", "developer-tools", Some("development")),
    category("Cloud Storage", "cloud-storage", Some("infrastructure")),
    category("Security", "security", Some("infrastructure")),
    category("Analytics", "analytics", Some("infrastructure")),
    category("Automation", "automation", Some("infrastructure")),
    category("Web Publishing", "web-publishing", Some("web")),
    category("Web Browsers", "web-browsers", Some("web")),
];

pub const PROPRIETARY: &[SeedProprietary] = &[
    SeedProprietary {
        name: "Microsoft Office",
        description: "Office suite with word processor, spreadsheet and presentation apps.",
        website: "https://www.office.com",
        keywords: &["office suite", "documents"],
    },
    SeedProprietary {
        name: "Notion",
        description: "All-in-one workspace for notes, wikis and project tracking.",
        website: "https://www.notion.so",
        keywords: &["notes", "wiki", "project management"],
    },
    SeedProprietary {
        name: "Evernote",
        description: "Note-taking and organisation app.",
        website: "https://evernote.com",
        keywords: &["notes"],
    },
    SeedProprietary {
        name: "Trello",
        description: "Kanban boards for teams.",
        website: "https://trello.com",
        keywords: &["kanban", "tasks"],
    },
    SeedProprietary {
        name: "Jira",
        description: "Issue and project tracking for software teams.",
        website: "https://www.atlassian.com/software/jira",
        keywords: &["issue tracking", "project management"],
    },
    SeedProprietary {
        name: "Slack",
        description: "Team messaging with channels and integrations.",
        website: "https://slack.com",
        keywords: &["team chat"],
    },
    SeedProprietary {
        name: "Zoom",
        description: "Video meetings and webinars.",
        website: "https://zoom.us",
        keywords: &["video conferencing"],
    },
    SeedProprietary {
        name: "Gmail",
        description: "Hosted email service.",
        website: "https://mail.google.com",
        keywords: &["email"],
    },
    SeedProprietary {
        name: "Adobe Photoshop",
        description: "Raster image editor.",
        website: "https://www.adobe.com/products/photoshop.html",
        keywords: &["photo editing", "painting"],
    },
    SeedProprietary {
        name: "Adobe Illustrator",
        description: "Vector graphics editor.",
        website: "https://www.adobe.com/products/illustrator.html",
        keywords: &["vector", "illustration"],
    },
    SeedProprietary {
        name: "Figma",
        description: "Collaborative interface design tool.",
        website: "https://www.figma.com",
        keywords: &["ui design", "prototyping"],
    },
    SeedProprietary {
        name: "Autodesk Maya",
        description: "3D modeling and animation software.",
        website: "https://www.autodesk.com/products/maya",
        keywords: &["3d modeling", "animation"],
    },
    SeedProprietary {
        name: "Adobe Premiere Pro",
        description: "Video editing software.",
        website: "https://www.adobe.com/products/premiere.html",
        keywords: &["video editing"],
    },
    SeedProprietary {
        name: "Plex",
        description: "Personal media server.",
        website: "https://www.plex.tv",
        keywords: &["media server", "streaming"],
    },
    SeedProprietary {
        name: "Postman",
        description: "API development and testing platform.",
        website: "https://www.postman.com",
        keywords: &["api testing"],
    },
    SeedProprietary {
        name: "Dropbox",
        description: "File hosting and synchronisation.",
        website: "https://www.dropbox.com",
        keywords: &["file sync", "cloud storage"],
    },
    SeedProprietary {
        name: "1Password",
        description: "Password manager.",
        website: "https://1password.com",
        keywords: &["password manager"],
    },
    SeedProprietary {
        name: "Google Analytics",
        description: "Website traffic analytics.",
        website: "https://analytics.google.com",
        keywords: &["web analytics"],
    },
    SeedProprietary {
        name: "Zapier",
        description: "Workflow automation between web apps.",
        website: "https://zapier.com",
        keywords: &["automation", "integrations"],
    },
    SeedProprietary {
        name: "Typeform",
        description: "Online forms and surveys.",
        website: "https://www.typeform.com",
        keywords: &["forms"],
    },
];

pub const ALTERNATIVES: &[SeedAlternative] = &[
    SeedAlternative {
        name: "LibreOffice",
        description: "Full office suite compatible with Microsoft Office formats.",
        website: "https://www.libreoffice.org",
        github_url: Some("https://github.com/LibreOffice/core"),
        license: "MPL-2.0",
        self_hosted: false,
        keywords: &["office suite", "spreadsheet", "presentation"],
        tags: &["Desktop", "Cross-platform"],
        tech_stacks: &["C++", "Java"],
        replaces: &["Microsoft Office"],
    },
    SeedAlternative {
        name: "OnlyOffice",
        description: "Office suite with real-time collaborative editing.",
        website: "https://www.onlyoffice.com",
        github_url: Some("https://github.com/ONLYOFFICE/DocumentServer"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["office suite", "documents"],
        tags: &["Collaboration", "Web"],
        tech_stacks: &["JavaScript", "C++"],
        replaces: &["Microsoft Office"],
    },
    SeedAlternative {
        name: "AppFlowy",
        description: "Workspace for notes, wikis and project boards that keeps data local.",
        website: "https://appflowy.io",
        github_url: Some("https://github.com/AppFlowy-IO/AppFlowy"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["notes", "wiki", "kanban"],
        tags: &["Privacy", "Desktop"],
        tech_stacks: &["Rust", "Flutter"],
        replaces: &["Notion"],
    },
    SeedAlternative {
        name: "Joplin",
        description: "Markdown note-taking app with end-to-end encrypted sync.",
        website: "https://joplinapp.org",
        github_url: Some("https://github.com/laurent22/joplin"),
        license: "AGPL-3.0",
        self_hosted: false,
        keywords: &["notes", "note taking"],
        tags: &["Markdown", "Privacy", "Cross-platform"],
        tech_stacks: &["TypeScript", "Electron"],
        replaces: &["Evernote", "Notion"],
    },
    SeedAlternative {
        name: "Outline",
        description: "Team knowledge base with a fast collaborative editor.",
        website: "https://www.getoutline.com",
        github_url: Some("https://github.com/outline/outline"),
        license: "BSL-1.1",
        self_hosted: true,
        keywords: &["knowledge base", "wiki"],
        tags: &["Collaboration", "Markdown"],
        tech_stacks: &["TypeScript", "React", "PostgreSQL"],
        replaces: &["Notion"],
    },
    SeedAlternative {
        name: "Wekan",
        description: "Kanban board with swimlanes and checklists.",
        website: "https://wekan.github.io",
        github_url: Some("https://github.com/wekan/wekan"),
        license: "MIT",
        self_hosted: true,
        keywords: &["kanban"],
        tags: &["Web"],
        tech_stacks: &["JavaScript", "MongoDB"],
        replaces: &["Trello"],
    },
    SeedAlternative {
        name: "Plane",
        description: "Issue tracking with cycles, modules and roadmaps.",
        website: "https://plane.so",
        github_url: Some("https://github.com/makeplane/plane"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["issue tracking", "project management"],
        tags: &["Web", "Collaboration"],
        tech_stacks: &["Python", "TypeScript", "PostgreSQL"],
        replaces: &["Jira", "Trello"],
    },
    SeedAlternative {
        name: "Mattermost",
        description: "Team messaging built for self-hosting.",
        website: "https://mattermost.com",
        github_url: Some("https://github.com/mattermost/mattermost"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["team chat", "messaging"],
        tags: &["Collaboration", "Web"],
        tech_stacks: &["Go", "React"],
        replaces: &["Slack"],
    },
    SeedAlternative {
        name: "Zulip",
        description: "Threaded team chat organised by topic.",
        website: "https://zulip.com",
        github_url: Some("https://github.com/zulip/zulip"),
        license: "Apache-2.0",
        self_hosted: true,
        keywords: &["team chat"],
        tags: &["Collaboration"],
        tech_stacks: &["Python", "Django", "PostgreSQL"],
        replaces: &["Slack"],
    },
    SeedAlternative {
        name: "Jitsi Meet",
        description: "Encrypted video meetings in the browser, no account needed.",
        website: "https://jitsi.org",
        github_url: Some("https://github.com/jitsi/jitsi-meet"),
        license: "Apache-2.0",
        self_hosted: true,
        keywords: &["video conferencing", "meetings"],
        tags: &["Privacy", "Web"],
        tech_stacks: &["JavaScript", "React", "Java"],
        replaces: &["Zoom"],
    },
    SeedAlternative {
        name: "BigBlueButton",
        description: "Virtual classroom and web conferencing.",
        website: "https://bigbluebutton.org",
        github_url: Some("https://github.com/bigbluebutton/bigbluebutton"),
        license: "LGPL-3.0",
        self_hosted: true,
        keywords: &["video calls"],
        tags: &["Education", "Web"],
        tech_stacks: &["Java", "JavaScript"],
        replaces: &["Zoom"],
    },
    SeedAlternative {
        name: "Thunderbird",
        description: "Email client with calendar and contacts.",
        website: "https://www.thunderbird.net",
        github_url: None,
        license: "MPL-2.0",
        self_hosted: false,
        keywords: &["email", "mail client"],
        tags: &["Desktop", "Cross-platform"],
        tech_stacks: &["C++", "JavaScript"],
        replaces: &["Gmail"],
    },
    SeedAlternative {
        name: "GIMP",
        description: "Raster image editor for retouching, composition and painting.",
        website: "https://www.gimp.org",
        github_url: Some("https://github.com/GNOME/gimp"),
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["photo editing", "raster"],
        tags: &["Desktop", "Cross-platform"],
        tech_stacks: &["C", "GTK"],
        replaces: &["Adobe Photoshop"],
    },
    SeedAlternative {
        name: "Krita",
        description: "Painting program made by artists.",
        website: "https://krita.org",
        github_url: Some("https://github.com/KDE/krita"),
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["painting", "illustration"],
        tags: &["Desktop"],
        tech_stacks: &["C++", "Qt"],
        replaces: &["Adobe Photoshop"],
    },
    SeedAlternative {
        name: "Inkscape",
        description: "Vector graphics editor built around SVG.",
        website: "https://inkscape.org",
        github_url: None,
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["vector", "illustration"],
        tags: &["Desktop", "SVG"],
        tech_stacks: &["C++", "GTK"],
        replaces: &["Adobe Illustrator"],
    },
    SeedAlternative {
        name: "Penpot",
        description: "Web-based design and prototyping on open standards.",
        website: "https://penpot.app",
        github_url: Some("https://github.com/penpot/penpot"),
        license: "MPL-2.0",
        self_hosted: true,
        keywords: &["ui design", "prototyping"],
        tags: &["Collaboration", "Web", "SVG"],
        tech_stacks: &["Clojure", "ClojureScript"],
        replaces: &["Figma"],
    },
    SeedAlternative {
        name: "Blender",
        description: "3D creation suite: modeling, animation, rendering and compositing.",
        website: "https://www.blender.org",
        github_url: Some("https://github.com/blender/blender"),
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["3d", "animation", "video editing"],
        tags: &["Desktop", "Cross-platform"],
        tech_stacks: &["C", "C++", "Python"],
        replaces: &["Autodesk Maya"],
    },
    SeedAlternative {
        name: "Kdenlive",
        description: "Multi-track video editor.",
        website: "https://kdenlive.org",
        github_url: Some("https://github.com/KDE/kdenlive"),
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["video editing"],
        tags: &["Desktop"],
        tech_stacks: &["C++", "Qt"],
        replaces: &["Adobe Premiere Pro"],
    },
    SeedAlternative {
        name: "Audacity",
        description: "Multi-track audio editor and recorder.",
        website: "https://www.audacityteam.org",
        github_url: Some("https://github.com/audacity/audacity"),
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["audio editing", "recording"],
        tags: &["Desktop", "Cross-platform"],
        tech_stacks: &["C++"],
        replaces: &[],
    },
    SeedAlternative {
        name: "Jellyfin",
        description: "Media server for movies, shows and music with no premium tier.",
        website: "https://jellyfin.org",
        github_url: Some("https://github.com/jellyfin/jellyfin"),
        license: "GPL-2.0",
        self_hosted: true,
        keywords: &["media server", "streaming"],
        tags: &["Privacy"],
        tech_stacks: &["C#", ".NET"],
        replaces: &["Plex"],
    },
    SeedAlternative {
        name: "Bruno",
        description: "API client that stores collections as plain files next to your code.",
        website: "https://www.usebruno.com",
        github_url: Some("https://github.com/usebruno/bruno"),
        license: "MIT",
        self_hosted: false,
        keywords: &["api testing"],
        tags: &["Desktop", "Offline"],
        tech_stacks: &["JavaScript", "Electron"],
        replaces: &["Postman"],
    },
    SeedAlternative {
        name: "Hoppscotch",
        description: "Lightweight API development ecosystem in the browser.",
        website: "https://hoppscotch.io",
        github_url: Some("https://github.com/hoppscotch/hoppscotch"),
        license: "MIT",
        self_hosted: true,
        keywords: &["api testing"],
        tags: &["Web"],
        tech_stacks: &["TypeScript", "Vue"],
        replaces: &["Postman"],
    },
    SeedAlternative {
        name: "Nextcloud",
        description: "File sync and sharing platform with calendar, contacts and office apps.",
        website: "https://nextcloud.com",
        github_url: Some("https://github.com/nextcloud/server"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["file sync", "file sharing", "cloud storage"],
        tags: &["Privacy", "Collaboration"],
        tech_stacks: &["PHP", "Vue"],
        replaces: &["Dropbox"],
    },
    SeedAlternative {
        name: "Syncthing",
        description: "Continuous peer-to-peer file synchronisation.",
        website: "https://syncthing.net",
        github_url: Some("https://github.com/syncthing/syncthing"),
        license: "MPL-2.0",
        self_hosted: true,
        keywords: &["file sync"],
        tags: &["Privacy", "Peer-to-peer"],
        tech_stacks: &["Go"],
        replaces: &["Dropbox"],
    },
    SeedAlternative {
        name: "Bitwarden",
        description: "Password manager with end-to-end encryption.",
        website: "https://bitwarden.com",
        github_url: Some("https://github.com/bitwarden/server"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["password manager"],
        tags: &["Privacy", "Cross-platform"],
        tech_stacks: &["C#", ".NET", "TypeScript"],
        replaces: &["1Password"],
    },
    SeedAlternative {
        name: "KeePassXC",
        description: "Offline password manager storing an encrypted local database.",
        website: "https://keepassxc.org",
        github_url: Some("https://github.com/keepassxreboot/keepassxc"),
        license: "GPL-3.0",
        self_hosted: false,
        keywords: &["passwords"],
        tags: &["Privacy", "Offline", "Desktop"],
        tech_stacks: &["C++", "Qt"],
        replaces: &["1Password"],
    },
    SeedAlternative {
        name: "Plausible",
        description: "Lightweight, cookie-free web analytics.",
        website: "https://plausible.io",
        github_url: Some("https://github.com/plausible/analytics"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["web analytics"],
        tags: &["Privacy", "Web"],
        tech_stacks: &["Elixir", "ClickHouse"],
        replaces: &["Google Analytics"],
    },
    SeedAlternative {
        name: "Matomo",
        description: "Full-featured web analytics with data ownership.",
        website: "https://matomo.org",
        github_url: Some("https://github.com/matomo-org/matomo"),
        license: "GPL-3.0",
        self_hosted: true,
        keywords: &["web analytics", "dashboards"],
        tags: &["Privacy"],
        tech_stacks: &["PHP", "MySQL"],
        replaces: &["Google Analytics"],
    },
    SeedAlternative {
        name: "n8n",
        description: "Workflow automation with a node-based editor.",
        website: "https://n8n.io",
        github_url: Some("https://github.com/n8n-io/n8n"),
        license: "Sustainable-Use",
        self_hosted: true,
        keywords: &["automation", "workflows", "integrations"],
        tags: &["Low-code"],
        tech_stacks: &["TypeScript", "Vue"],
        replaces: &["Zapier"],
    },
    SeedAlternative {
        name: "Formbricks",
        description: "Survey and form platform.",
        website: "https://formbricks.com",
        github_url: Some("https://github.com/formbricks/formbricks"),
        license: "AGPL-3.0",
        self_hosted: true,
        keywords: &["forms", "surveys"],
        tags: &["Web"],
        tech_stacks: &["TypeScript", "Next.js"],
        replaces: &["Typeform"],
    },
];
