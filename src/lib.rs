pub mod cloud {
    pub mod aws;
    pub mod rekognition;
    pub mod storage;
}

pub mod graphics {
    pub mod images;
}

pub mod processing {
    pub mod args;
    pub mod context;
    pub mod filename;
    pub mod identities;
    pub mod outcome;
    pub mod reference;
    pub mod resolve;
    pub mod runner;
    pub mod settings;
}

pub mod stack {
    pub mod outputs;
    pub mod provision;
}
